use std::ops::Index;
use std::slice;

/// A single URL parameter, consisting of a key and a value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Param {
    pub key: String,
    pub value: String,
}

/// The parameters captured from a request path, in the order the template
/// declares them.
///
/// A fresh `Params` is produced by every successful dispatch. Handlers served
/// through [`Router::serve`](crate::Router::serve) find it in the request
/// extensions.
///
/// ```rust
/// use staticrouter::CompiledRoute;
///
/// let route = CompiledRoute::compile("/blog/<category>/<int:post>").unwrap();
/// let params = route.matches("/blog/rust/42").unwrap();
///
/// assert_eq!(params.get("category"), Some("rust"));
/// assert_eq!(params[1].key, "post");
/// assert_eq!(params[1].value, "42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Params {
    vec: Vec<Param>,
}

impl Params {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            vec: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vec.push(Param {
            key: key.into(),
            value: value.into(),
        });
    }

    /// Returns the value of the first parameter registered under the given key.
    pub fn get(&self, key: impl AsRef<str>) -> Option<&str> {
        let key = key.as_ref();
        self.vec
            .iter()
            .find(|param| param.key == key)
            .map(|param| param.value.as_str())
    }

    /// Returns an iterator over the parameters in declaration order.
    pub fn iter(&self) -> slice::Iter<'_, Param> {
        self.vec.iter()
    }

    pub fn len(&self) -> usize {
        self.vec.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vec.is_empty()
    }
}

impl Index<usize> for Params {
    type Output = Param;

    fn index(&self, i: usize) -> &Param {
        &self.vec[i]
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = &'a Param;
    type IntoIter = slice::Iter<'a, Param>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
