//! core-actions: the Vim command registry and the modal key dispatcher.
//!
//! Layout:
//! * `registry`   - `(mode, key) -> VimCommand` table built once per process.
//! * `commands`   - the command bodies; each is a plain `fn(&mut VimContext)`.
//! * `dispatcher` - routes key events through the pending-key buffer to the
//!   registry, applies cursor styles and notifies mode observers.
//!
//! Nothing here owns the text. The host hands a `TextInput` to every call and
//! settles deferred cursor placement on its next frame via
//! [`VimDispatcher::settle`].

pub mod commands;
pub mod dispatcher;
pub mod registry;

pub use dispatcher::command_parser::{CommandParser, ParsedCommand, SubstituteRange};
pub use dispatcher::{KeyOutcome, ModeObserver, VimDispatcher};
pub use registry::{CommandFn, CommandRegistry, ModeTable, VimCommand};
