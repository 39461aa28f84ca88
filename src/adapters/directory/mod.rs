pub mod site_snapshot;
