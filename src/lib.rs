pub mod cache;
pub mod config;
pub mod extractor;
pub mod fetch;
pub mod output;
pub mod parser;
pub mod poller;
pub mod publish;
pub mod service_day;

pub mod gtfs_rt {
    include!(concat!(env!("OUT_DIR"), "/transit_realtime.rs"));
}

pub mod internal_messages {
    include!(concat!(env!("OUT_DIR"), "/internal_messages.rs"));
}
