use proptest::prelude::*;
use scanmap_rs::core::Orientation;
use scanmap_rs::raster::{CellWindow, Traversal, buffer_index, pixel_cell};

fn orientation() -> impl Strategy<Value = Orientation> {
    prop_oneof![Just(Orientation::Vertical), Just(Orientation::Horizontal)]
}

proptest! {
    #[test]
    fn pixel_cell_inverts_buffer_index(
        min_row in 0usize..50,
        rows in 1usize..40,
        min_col in 0usize..50,
        cols in 1usize..40,
        pick_row in 0usize..40,
        pick_col in 0usize..40,
        orientation in orientation(),
        domain_reversed in any::<bool>(),
        range_reversed in any::<bool>()
    ) {
        let window = CellWindow {
            min_row,
            max_row: min_row + rows - 1,
            min_col,
            max_col: min_col + cols - 1,
        };
        let row = min_row + pick_row % rows;
        let col = min_col + pick_col % cols;
        let (width, height) = window.image_size(orientation);
        let traversal = Traversal { orientation, domain_reversed, range_reversed };

        let index = buffer_index(row, col, window, traversal);
        prop_assert!(index < width * height);
        prop_assert_eq!(pixel_cell(index % width, index / width, window, traversal), (row, col));
    }
}
