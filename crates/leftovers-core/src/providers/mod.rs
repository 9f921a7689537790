//! Provider adapters implementing `Lister` and `Deletable`.

pub mod gcp;
