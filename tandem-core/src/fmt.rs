//! Logging macros
//!
//! Forward to `defmt` when the `defmt` feature is enabled and compile to
//! nothing otherwise. Arguments are still type-checked in both builds, so
//! only use `{}` and `{:?}` placeholders.

#![allow(unused_macros)]

#[cfg(feature = "defmt")]
macro_rules! __log {
    ($level:ident, $($arg:tt)*) => {
        ::defmt::$level!($($arg)*)
    };
}

#[cfg(not(feature = "defmt"))]
macro_rules! __log {
    ($level:ident, $($arg:tt)*) => {{
        if false {
            let _ = ::core::format_args!($($arg)*);
        }
    }};
}

macro_rules! trace {
    ($($arg:tt)*) => { __log!(trace, $($arg)*) };
}

macro_rules! debug {
    ($($arg:tt)*) => { __log!(debug, $($arg)*) };
}

macro_rules! info {
    ($($arg:tt)*) => { __log!(info, $($arg)*) };
}

macro_rules! warn {
    ($($arg:tt)*) => { __log!(warn, $($arg)*) };
}

macro_rules! error {
    ($($arg:tt)*) => { __log!(error, $($arg)*) };
}
