// Fixed, read-only color palette assigned to sessions in join order (§5
// Shared resources: "the global palette of player colors is read-only").

const PALETTE: [&str; 10] = [
    "#ef4444", "#f97316", "#facc15", "#22c55e", "#14b8a6", "#06b6d4", "#3b82f6", "#8b5cf6",
    "#d946ef", "#ec4899",
];

pub fn color_for_slot(slot: usize) -> &'static str {
    PALETTE[slot % PALETTE.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_around_after_palette_length() {
        assert_eq!(color_for_slot(0), color_for_slot(PALETTE.len()));
    }
}
