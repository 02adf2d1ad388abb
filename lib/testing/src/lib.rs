mod fixture;

pub use fixture::TempSite;
