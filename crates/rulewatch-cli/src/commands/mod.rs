pub mod capture;
pub mod live;
pub mod snapshots;
