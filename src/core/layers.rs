//! Layer/mask helpers for naming collision categories.
//!
//! ```
//! use arcade_physics::core::layers::{mask_includes, mask_of, LayerCategory};
//!
//! #[derive(Clone, Copy)]
//! enum Layer {
//!     Player,
//!     Wall,
//!     Pickup,
//! }
//!
//! impl LayerCategory for Layer {
//!     fn index(self) -> u8 {
//!         self as u8
//!     }
//! }
//!
//! let blocking = mask_of([Layer::Wall, Layer::Player]);
//! assert!(mask_includes(blocking, Layer::Wall.bit()));
//! assert!(!mask_includes(blocking, Layer::Pickup.bit()));
//! ```

/// A named collision category occupying one of the 32 layer bits.
pub trait LayerCategory: Copy {
    /// Bit position in `0..32`.
    fn index(self) -> u8;

    fn bit(self) -> u32 {
        layer_bit(self.index())
    }
}

/// Single-bit layer value for bit position `index`. Out-of-range indices yield an empty layer.
pub const fn layer_bit(index: u8) -> u32 {
    if index < 32 {
        1u32 << index
    } else {
        0
    }
}

/// ORs several categories into one mask.
pub fn mask_of<C, I>(categories: I) -> u32
where
    C: LayerCategory,
    I: IntoIterator<Item = C>,
{
    categories
        .into_iter()
        .fold(0, |mask, category| mask | category.bit())
}

pub const fn mask_includes(mask: u32, bit: u32) -> bool {
    mask & bit != 0
}
