//! Logging shims.
//!
//! With the `defmt-03` feature the macros forward to `defmt`, otherwise they
//! compile to nothing while still borrowing their arguments.
#![macro_use]
#![allow(unused_macros)]

macro_rules! trace {
    ($s:literal $(, $x:expr)* $(,)?) => {
        {
            #[cfg(feature = "defmt-03")]
            {
                use $crate::defmt;
                defmt::trace!($s $(, $x)*);
            }
            #[cfg(not(feature = "defmt-03"))]
            let _ = ($( & $x ),*);
        }
    };
}

macro_rules! debug {
    ($s:literal $(, $x:expr)* $(,)?) => {
        {
            #[cfg(feature = "defmt-03")]
            {
                use $crate::defmt;
                defmt::debug!($s $(, $x)*);
            }
            #[cfg(not(feature = "defmt-03"))]
            let _ = ($( & $x ),*);
        }
    };
}

macro_rules! error {
    ($s:literal $(, $x:expr)* $(,)?) => {
        {
            #[cfg(feature = "defmt-03")]
            {
                use $crate::defmt;
                defmt::error!($s $(, $x)*);
            }
            #[cfg(not(feature = "defmt-03"))]
            let _ = ($( & $x ),*);
        }
    };
}

macro_rules! warn {
    ($s:literal $(, $x:expr)* $(,)?) => {
        {
            #[cfg(feature = "defmt-03")]
            {
                use $crate::defmt;
                defmt::warn!($s $(, $x)*);
            }
            #[cfg(not(feature = "defmt-03"))]
            let _ = ($( & $x ),*);
        }
    };
}
