//! Mode handlers and ECS systems for the arena editor.
//!
//! ## Tick Order
//!
//! `ArenaWorld::update` runs once per frame:
//!
//! 1. **Mode transition** - the toolbar's requested mode is applied; an active
//!    edit grab is reverted and the pointer latch is cleared.
//! 2. **Pointer handler** for the current mode, in event order press, sample,
//!    release:
//!    - `create` - brush painting and drag placement
//!    - `edit` - grab, follow pointer, drop or revert
//!    - `erase` - sweep to remove
//! 3. **Play schedule** (play mode only):
//!    - `play_tick_system` - advances `PlayTicks` on active deployables
//!
//! Everything runs on one thread inside one tick; no two occupancy writes
//! ever interleave.

pub mod create;
pub mod edit;
pub mod erase;
pub mod placement;
pub mod play;

pub use play::*;
