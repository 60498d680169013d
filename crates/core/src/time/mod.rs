pub mod window;

pub use window::{parse_period, resolve_window, DateWindow, Period, PeriodUnit, DEFAULT_PERIOD};
