//! Parameter Sets

use crate::geometry::*;
use crate::pbrt::*;
use crate::spectrum::*;
use std::cell::Cell;
use std::collections::HashMap;
use std::fmt;

/// A named parameter value list. Lookups mark the item as used so that
/// misspelled or unsupported parameters can be reported.
#[derive(Clone, Debug)]
pub struct ParamSetItem<T> {
    /// The values.
    pub values: Vec<T>,

    /// Set once the item was read.
    looked_up: Cell<bool>,
}

impl<T> ParamSetItem<T> {
    /// Create a new `ParamSetItem`.
    ///
    /// * `values` - The values.
    pub fn new(values: Vec<T>) -> Self {
        Self {
            values,
            looked_up: Cell::new(false),
        }
    }

    /// Returns true if the item has been read.
    pub fn looked_up(&self) -> bool {
        self.looked_up.get()
    }
}

/// A hashmap of parameter set items stored by name.
pub type ParamSetMap<T> = HashMap<String, ParamSetItem<T>>;

/// Stores parameter set items of different types in hashmaps.
#[derive(Clone, Default)]
pub struct ParamSet {
    pub bools: ParamSetMap<bool>,
    pub ints: ParamSetMap<Int>,
    pub floats: ParamSetMap<Float>,
    pub point3fs: ParamSetMap<Point3f>,
    pub spectra: ParamSetMap<Spectrum>,
    pub strings: ParamSetMap<String>,
}

/// Generates a function for adding/replacing a parameter set item.
macro_rules! paramset_add {
    ($func: ident, $t: ty, $paramset: ident) => {
        pub fn $func(&mut self, name: &str, values: &[$t]) {
            self.$paramset
                .insert(String::from(name), ParamSetItem::new(values.to_vec()));
        }
    };
}

/// Generates a function for finding a parameter stored as a single item.
/// Lists of any other length yield the default.
macro_rules! paramset_find_one {
    ($func: ident, $t: ty, $paramset: ident) => {
        pub fn $func(&self, name: &str, default: $t) -> $t {
            match self.$paramset.get(name) {
                Some(param) if param.values.len() == 1 => {
                    param.looked_up.set(true);
                    param.values[0].clone()
                }
                _ => default,
            }
        }
    };
}

/// Generates a function for finding a parameter stored as a list.
macro_rules! paramset_find {
    ($func: ident, $t: ty, $paramset: ident) => {
        pub fn $func(&self, name: &str) -> Vec<$t> {
            match self.$paramset.get(name) {
                Some(param) => {
                    param.looked_up.set(true);
                    param.values.clone()
                }
                None => vec![],
            }
        }
    };
}

/// Collects names of items that were never read.
macro_rules! collect_unused {
    ($params: expr, $param_type: literal, $unused: expr) => {
        for (name, param) in $params.iter() {
            if !param.looked_up() {
                $unused.push(format!("{} {}", $param_type, name));
            }
        }
    };
}

/// Prints parameter set items.
macro_rules! display_param {
    ($params: expr, $param_type: literal, $formatter: expr) => {
        for (name, param) in $params.iter() {
            write!($formatter, "\"{} {}\" [", $param_type, name)?;
            for (i, v) in param.values.iter().enumerate() {
                if i > 0 {
                    write!($formatter, " ")?;
                }
                write!($formatter, "{}", v)?;
            }
            writeln!($formatter, "]")?;
        }
    };
}

impl ParamSet {
    /// Returns a new `ParamSet`.
    pub fn new() -> Self {
        Self::default()
    }

    paramset_find_one!(find_one_bool, bool, bools);
    paramset_find!(find_bool, bool, bools);
    paramset_add!(add_bool, bool, bools);

    paramset_find_one!(find_one_int, Int, ints);
    paramset_find!(find_int, Int, ints);
    paramset_add!(add_int, Int, ints);

    paramset_find_one!(find_one_float, Float, floats);
    paramset_find!(find_float, Float, floats);
    paramset_add!(add_float, Float, floats);

    paramset_find_one!(find_one_point3f, Point3f, point3fs);
    paramset_find!(find_point3f, Point3f, point3fs);
    paramset_add!(add_point3f, Point3f, point3fs);

    paramset_find_one!(find_one_spectrum, Spectrum, spectra);
    paramset_find!(find_spectrum, Spectrum, spectra);
    paramset_add!(add_spectrum, Spectrum, spectra);

    paramset_find_one!(find_one_string, String, strings);
    paramset_find!(find_string, String, strings);
    paramset_add!(add_string, String, strings);

    /// Add/replace an RGB spectrum.
    ///
    /// * `name`   - Parameter name.
    /// * `values` - RGB values in a linear slice; length must be a multiple
    ///              of 3.
    pub fn add_rgb_spectrum(&mut self, name: &str, values: &[Float]) {
        debug_assert!(values.len() % 3 == 0, "RGB spectrum values % 3 != 0");
        let spectra = values
            .chunks_exact(3)
            .map(|c| Spectrum::from_rgb([c[0], c[1], c[2]]))
            .collect();
        self.spectra
            .insert(String::from(name), ParamSetItem::new(spectra));
    }

    /// Logs a warning for every parameter that was never looked up and
    /// returns their names.
    pub fn report_unused(&self) -> Vec<String> {
        let mut unused = vec![];
        collect_unused!(self.bools, "bool", unused);
        collect_unused!(self.ints, "integer", unused);
        collect_unused!(self.floats, "float", unused);
        collect_unused!(self.point3fs, "point3", unused);
        collect_unused!(self.spectra, "rgb", unused);
        collect_unused!(self.strings, "string", unused);

        unused.sort();
        for name in unused.iter() {
            warn!("Parameter \"{}\" not used", name);
        }
        unused
    }
}

impl fmt::Display for ParamSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        display_param!(self.bools, "bool", f);
        display_param!(self.ints, "integer", f);
        display_param!(self.floats, "float", f);
        display_param!(self.spectra, "rgb", f);
        display_param!(self.strings, "string", f);
        Ok(())
    }
}

// ---- Tests ----
