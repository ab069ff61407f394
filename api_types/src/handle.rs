use slotmap::new_key_type;

new_key_type! {
    /// Handle to a texture slot owned by the texture manager.
    ///
    /// Handles carry a generation, so a handle kept around after its slot was
    /// released (e.g. from a previous build) is detected as stale instead of
    /// silently aliasing whatever reused the slot.
    pub struct TextureHandle;
}

#[cfg(test)]
mod tests {
    use slotmap::SlotMap;
    use super::TextureHandle;

    #[test]
    fn reused_slot_gets_new_generation() {
        let mut slots: SlotMap<TextureHandle, &str> = SlotMap::with_key();
        let first = slots.insert("first");
        slots.remove(first);
        let second = slots.insert("second");

        assert_ne!(first, second);
        assert!(slots.get(first).is_none());
        assert_eq!(slots.get(second), Some(&"second"));
    }
}
