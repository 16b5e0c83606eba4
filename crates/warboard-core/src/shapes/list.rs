//! Ordered shape collection with single selection.

use super::{Shape, ShapeId, ShapeKind, StrokeColor};
use kurbo::Point;

/// Shapes in insertion order (back to front) plus the single selection.
///
/// Draw order iterates front-to-back of the list; hit-testing walks it in
/// reverse so the topmost shape wins.
#[derive(Debug, Clone, Default)]
pub struct ShapeList {
    shapes: Vec<Shape>,
    next_id: ShapeId,
    selected: Option<ShapeId>,
}

impl ShapeList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new shape and return its id.
    pub fn create(
        &mut self,
        kind: ShapeKind,
        start: Point,
        end: Point,
        color: StrokeColor,
        thickness: f64,
    ) -> ShapeId {
        let id = self.next_id;
        self.next_id += 1;
        self.shapes
            .push(Shape::new(id, kind, start, end, color, thickness));
        log::debug!("Created {kind} {id} from {start:?} to {end:?}");
        id
    }

    /// Shapes in draw order.
    pub fn iter(&self) -> impl Iterator<Item = &Shape> {
        self.shapes.iter()
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.id == id)
    }

    pub fn get_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.shapes.iter_mut().find(|s| s.id == id)
    }

    /// Topmost shape near `point`.
    pub fn hit(&self, point: Point, tolerance: f64) -> Option<ShapeId> {
        self.shapes
            .iter()
            .rev()
            .find(|s| s.hit_test(point, tolerance))
            .map(|s| s.id)
    }

    /// Select `id`, deselecting any previous shape. Unknown ids deselect all.
    pub fn select(&mut self, id: ShapeId) {
        self.deselect();
        if let Some(shape) = self.get_mut(id) {
            shape.selected = true;
            shape.rebase_size();
            self.selected = Some(id);
        }
    }

    pub fn deselect(&mut self) {
        if let Some(prev) = self.selected.take() {
            if let Some(shape) = self.get_mut(prev) {
                shape.selected = false;
            }
        }
    }

    pub fn selected_id(&self) -> Option<ShapeId> {
        self.selected
    }

    pub fn selected(&self) -> Option<&Shape> {
        self.selected.and_then(|id| self.get(id))
    }

    pub fn selected_mut(&mut self) -> Option<&mut Shape> {
        let id = self.selected?;
        self.get_mut(id)
    }

    /// Remove the selected shape. A no-op without a selection.
    pub fn delete_selected(&mut self) -> Option<Shape> {
        let id = self.selected.take()?;
        let index = self.shapes.iter().position(|s| s.id == id)?;
        let removed = self.shapes.remove(index);
        log::debug!("Deleted shape {id}");
        Some(removed)
    }

    /// Remove every shape. Ids keep counting up.
    pub fn clear(&mut self) {
        self.shapes.clear();
        self.selected = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_with_two() -> (ShapeList, ShapeId, ShapeId) {
        let mut list = ShapeList::new();
        let a = list.create(
            ShapeKind::Rectangle,
            Point::new(0.0, 0.0),
            Point::new(100.0, 100.0),
            StrokeColor::red(),
            2.0,
        );
        let b = list.create(
            ShapeKind::Star,
            Point::new(80.0, 80.0),
            Point::new(130.0, 130.0),
            StrokeColor::red(),
            2.0,
        );
        (list, a, b)
    }

    fn selected_count(list: &ShapeList) -> usize {
        list.iter().filter(|s| s.is_selected()).count()
    }

    #[test]
    fn test_ids_are_monotonic() {
        let (mut list, a, b) = list_with_two();
        assert_eq!((a, b), (0, 1));
        list.clear();
        let c = list.create(
            ShapeKind::Line,
            Point::ZERO,
            Point::new(1.0, 1.0),
            StrokeColor::red(),
            1.0,
        );
        assert_eq!(c, 2);
    }

    #[test]
    fn test_hit_prefers_topmost() {
        let (list, _a, b) = list_with_two();
        assert_eq!(list.hit(Point::new(100.0, 100.0), 10.0), Some(b));
        assert_eq!(list.hit(Point::new(300.0, 300.0), 10.0), None);
    }

    #[test]
    fn test_single_selection() {
        let (mut list, a, b) = list_with_two();
        list.select(a);
        list.select(b);
        assert_eq!(selected_count(&list), 1);
        assert_eq!(list.selected_id(), Some(b));
        list.select(999);
        assert_eq!(selected_count(&list), 0);
        assert_eq!(list.selected_id(), None);
    }

    #[test]
    fn test_delete_selected() {
        let (mut list, a, _b) = list_with_two();
        assert!(list.delete_selected().is_none());
        assert_eq!(list.len(), 2);

        list.select(a);
        let removed = list.delete_selected().unwrap();
        assert_eq!(removed.id(), a);
        assert_eq!(list.len(), 1);
        assert_eq!(list.selected_id(), None);
        assert_eq!(selected_count(&list), 0);
    }

    #[test]
    fn test_selection_rebases_size() {
        let (mut list, a, _) = list_with_two();
        list.select(a);
        list.selected_mut().unwrap().scale_around_center(50.0);
        list.select(a);
        list.selected_mut().unwrap().scale_around_center(100.0);
        let bounds = list.get(a).unwrap().bounds();
        assert!((bounds.width() - 50.0).abs() < 1e-9);
    }
}
