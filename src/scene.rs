//! Retained primitive store with z-ordering.
//!
//! The scene is the canvas-style lifecycle layer between the gauges and the
//! display: primitives are created once and referenced by [`ItemId`], text
//! can be updated in place, items can be deleted or raised to the front.
//! List order is z-order; [`Scene::draw`] paints from the back to the front.
//!
//! # Frame Lifecycle
//!
//! | Item | Lifetime | Per frame |
//! |------|----------|-----------|
//! | Tape frame, gauge title | Whole session | Nothing |
//! | Ticks, labels, zone boxes, danger bar | One frame | Deleted and recreated |
//! | Needle | Whole session | Raised above the new zone boxes |
//! | Readout | Whole session | Text updated, raised last |
//!
//! Ids are never reused, so a stale id from a previous frame can never
//! alias a newer item.

use embedded_graphics::{pixelcolor::Rgb565, prelude::DrawTarget};

use crate::render::Primitive;

/// Handle to an item in a [`Scene`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ItemId(u64);

/// Ordered collection of primitives; last item is drawn on top.
#[derive(Debug, Default)]
pub struct Scene {
    items: Vec<(ItemId, Primitive)>,
    next_id: u64,
}

impl Scene {
    pub fn new() -> Self { Self::default() }

    /// Add a primitive on top of everything else.
    pub fn create(
        &mut self,
        primitive: Primitive,
    ) -> ItemId {
        let id = ItemId(self.next_id);
        self.next_id += 1;
        self.items.push((id, primitive));
        id
    }

    /// Remove an item. Returns `false` if it did not exist.
    pub fn delete(
        &mut self,
        id: ItemId,
    ) -> bool {
        match self.position(id) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        }
    }

    /// Remove every listed item, ignoring ids that are already gone.
    pub fn delete_all<I>(
        &mut self,
        ids: I,
    ) where
        I: IntoIterator<Item = ItemId>,
    {
        let doomed: Vec<ItemId> = ids.into_iter().collect();
        if !doomed.is_empty() {
            self.items.retain(|(id, _)| !doomed.contains(id));
        }
    }

    /// Move an item to the front of the z-order.
    pub fn raise(
        &mut self,
        id: ItemId,
    ) -> bool {
        match self.position(id) {
            Some(index) => {
                let item = self.items.remove(index);
                self.items.push(item);
                true
            }
            None => false,
        }
    }

    /// Replace the content of a text item.
    ///
    /// Returns `false` if the item does not exist or is not text.
    pub fn set_text(
        &mut self,
        id: ItemId,
        content: &str,
    ) -> bool {
        self.items
            .iter_mut()
            .find(|(item_id, _)| *item_id == id)
            .is_some_and(|(_, primitive)| primitive.set_text(content))
    }

    pub fn get(
        &self,
        id: ItemId,
    ) -> Option<&Primitive> {
        self.items.iter().find(|(item_id, _)| *item_id == id).map(|(_, p)| p)
    }

    pub fn contains(
        &self,
        id: ItemId,
    ) -> bool {
        self.position(id).is_some()
    }

    #[inline]
    pub fn len(&self) -> usize { self.items.len() }

    #[inline]
    pub fn is_empty(&self) -> bool { self.items.is_empty() }

    /// Item ids from back to front.
    pub fn ids(&self) -> impl Iterator<Item = ItemId> + '_ { self.items.iter().map(|(id, _)| *id) }

    /// Z-index of an item (0 = bottom).
    pub fn position(
        &self,
        id: ItemId,
    ) -> Option<usize> {
        self.items.iter().position(|(item_id, _)| *item_id == id)
    }

    /// Paint every item from back to front.
    pub fn draw<D>(
        &self,
        target: &mut D,
    ) where
        D: DrawTarget<Color = Rgb565>,
    {
        for (_, primitive) in &self.items {
            primitive.draw(target);
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use embedded_graphics::prelude::{Point, Size};
    use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
    use embedded_graphics_simulator::SimulatorDisplay;

    use super::*;
    use crate::colors::{CYAN, HUD_GREEN, RED};
    use crate::styles::{CENTERED, LABEL_FONT};

    fn square(
        x: i32,
        color: Rgb565,
    ) -> Primitive {
        Primitive::Rect {
            rect: Rectangle::new(Point::new(x, 0), Size::new(4, 4)),
            style: PrimitiveStyle::with_fill(color),
        }
    }

    // -------------------------------------------------------------------------
    // Lifecycle Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_create_appends_on_top() {
        let mut scene = Scene::new();
        let a = scene.create(square(0, RED));
        let b = scene.create(square(0, CYAN));

        assert_eq!(scene.len(), 2);
        assert_eq!(scene.ids().collect::<Vec<_>>(), vec![a, b], "Newest item is last");
        assert_ne!(a, b, "Ids must be unique");
    }

    #[test]
    fn test_delete() {
        let mut scene = Scene::new();
        let a = scene.create(square(0, RED));
        let b = scene.create(square(0, CYAN));

        assert!(scene.delete(a), "Existing item should delete");
        assert!(!scene.delete(a), "Second delete should report missing");
        assert!(!scene.contains(a));
        assert!(scene.contains(b));
    }

    #[test]
    fn test_ids_not_reused_after_delete() {
        let mut scene = Scene::new();
        let a = scene.create(square(0, RED));
        scene.delete(a);
        let b = scene.create(square(0, RED));
        assert_ne!(a, b, "Deleted id must not be handed out again");
        assert!(!scene.contains(a));
    }

    #[test]
    fn test_ids_keep_counting_past_u32() {
        let mut scene = Scene::new();
        let first = scene.create(square(0, RED));
        scene.next_id = u64::from(u32::MAX);
        let a = scene.create(square(0, RED));
        let b = scene.create(square(0, RED));

        assert_ne!(b, first, "Ids must not wrap back onto old items");
        assert_eq!(b, ItemId(u64::from(u32::MAX) + 1));
        assert_eq!(scene.len(), 3);
        assert!(scene.contains(a) && scene.contains(first));
    }

    #[test]
    fn test_delete_all() {
        let mut scene = Scene::new();
        let keep = scene.create(square(0, RED));
        let dynamic: Vec<ItemId> = (0..5).map(|i| scene.create(square(i * 5, CYAN))).collect();

        scene.delete_all(dynamic.iter().copied());
        assert_eq!(scene.len(), 1);
        assert!(scene.contains(keep));

        // Already-deleted ids are ignored
        scene.delete_all(dynamic);
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn test_raise_moves_to_front() {
        let mut scene = Scene::new();
        let needle = scene.create(square(0, HUD_GREEN));
        let zone = scene.create(square(0, CYAN));

        assert!(scene.raise(needle));
        assert_eq!(scene.position(needle), Some(1), "Raised item should be topmost");
        assert_eq!(scene.position(zone), Some(0));
    }

    #[test]
    fn test_raise_missing_item() {
        let mut scene = Scene::new();
        let a = scene.create(square(0, RED));
        scene.delete(a);
        assert!(!scene.raise(a), "Raising a deleted item should fail");
    }

    #[test]
    fn test_set_text() {
        let mut scene = Scene::new();
        let readout = scene.create(Primitive::text("---", Point::zero(), LABEL_FONT, HUD_GREEN, CENTERED));
        let rect = scene.create(square(0, RED));

        assert!(scene.set_text(readout, "3120"));
        assert_eq!(scene.get(readout).and_then(Primitive::text_content), Some("3120"));
        assert!(!scene.set_text(rect, "x"), "Rectangles carry no text");
    }

    // -------------------------------------------------------------------------
    // Drawing Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_draw_respects_z_order() {
        let mut canvas = SimulatorDisplay::<Rgb565>::new(Size::new(8, 8));
        let mut scene = Scene::new();
        let bottom = scene.create(square(0, RED));
        scene.create(square(0, CYAN));

        scene.draw(&mut canvas);
        assert_eq!(canvas.get_pixel(Point::new(1, 1)), CYAN, "Later item paints over earlier");

        let mut canvas = SimulatorDisplay::<Rgb565>::new(Size::new(8, 8));
        scene.raise(bottom);
        scene.draw(&mut canvas);
        assert_eq!(canvas.get_pixel(Point::new(1, 1)), RED, "Raised item paints last");
    }
}
