pub mod diagnostics;
pub mod dialects;
pub mod messages;
pub mod validation;

#[cfg(test)]
pub(crate) mod test_support;
