pub mod modules;
pub use modules::profile;
pub mod shared;

#[cfg(test)]
mod tests;
