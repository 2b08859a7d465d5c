pub(crate) mod index;
pub(crate) mod status;
pub(crate) mod uid;
