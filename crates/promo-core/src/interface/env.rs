///
/// EnvReader
///

pub trait EnvReader {
    /// Returns the variable's value; unset and empty are both `None`.
    fn var(&self, name: &str) -> Option<String>;
}
