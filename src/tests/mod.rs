mod collision;
mod nfr;
mod persistence;
mod stress;
mod sync;
mod traits;
mod transient;
