pub(crate) mod assign;
pub(crate) mod map;
pub(crate) mod meta;
pub(crate) mod overview;
pub(crate) mod report;
pub(crate) mod shared;
