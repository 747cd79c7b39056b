/// Read side of parameter binding: expansion pulls values by name
/// through this trait, so callers can back it with whatever holds their
/// configuration.
pub trait Resolver {
    /// Every name this resolver can answer for, in a stable order.
    fn names(&self) -> Vec<&str>;

    /// The ordered values bound to `name`, `None` when unknown.
    fn values(&self, name: &str) -> Option<&[String]>;
}

/// Insertion-ordered multimap of extracted parameter bindings. Also the
/// write side of extraction: names can be registered with or without
/// values, and a known-but-unbound name stays distinguishable from an
/// unknown one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    entries: Vec<(String, Vec<String>)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `name` without binding a value.
    pub fn add_name(&mut self, name: &str) {
        if self.entry(name).is_none() {
            self.entries.push((name.to_owned(), Vec::new()));
        }
    }

    /// Appends `value` to the bindings of `name`.
    pub fn add_value(&mut self, name: &str, value: &str) {
        match self.entry(name) {
            Some(values) => values.push(value.to_owned()),
            None => self
                .entries
                .push((name.to_owned(), vec![value.to_owned()])),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn values(&self, name: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find_map(|(n, values)| if n == name { Some(values.as_slice()) } else { None })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    fn entry(&mut self, name: &str) -> Option<&mut Vec<String>> {
        self.entries
            .iter_mut()
            .find_map(|(n, values)| if n == name { Some(values) } else { None })
    }
}

impl Resolver for Params {
    fn names(&self) -> Vec<&str> {
        Params::names(self)
    }

    fn values(&self, name: &str) -> Option<&[String]> {
        Params::values(self, name)
    }
}

impl<R: Resolver + ?Sized> Resolver for &R {
    fn names(&self) -> Vec<&str> {
        (**self).names()
    }

    fn values(&self, name: &str) -> Option<&[String]> {
        (**self).values(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_keep_insertion_order() {
        let mut params = Params::new();
        params.add_value("b", "1");
        params.add_name("a");
        params.add_value("b", "2");
        assert_eq!(params.names(), vec!["b", "a"]);
        assert_eq!(params.values("b"), Some(&["1".to_owned(), "2".to_owned()][..]));
        assert_eq!(params.values("a"), Some(&[][..]));
        assert_eq!(params.values("c"), None);
    }
}
