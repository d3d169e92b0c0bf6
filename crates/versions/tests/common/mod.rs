#![allow(unused_imports)]

pub mod mocks;

pub use mocks::*;
