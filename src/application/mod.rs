pub mod coordinator;
pub mod interaction;

pub use coordinator::{CancelToken, LoadCoordinator, LoadTicket};
pub use interaction::{ChartKey, InputEvent, InteractionController, PointerButton, Redraw};
