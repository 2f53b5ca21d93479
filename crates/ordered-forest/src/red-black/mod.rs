//! Red-black tree algorithms over pool-resident nodes.

pub(crate) mod util;

pub(crate) use util::{assert_red_black_tree, find, insert, print, remove};
