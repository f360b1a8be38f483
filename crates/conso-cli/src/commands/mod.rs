pub mod reconcile;
pub mod run;
