pub mod shared {
    pub mod core {
        pub mod primitives;
    }
    pub mod infrastructure {
        pub mod entity_store;
    }
}

pub mod modules {
    pub mod tables {
        pub mod core {
            pub mod entity;
            pub mod errors;
            pub mod etag;
            pub mod evolve;
            pub mod operation;
            pub mod property;
        }
        pub mod use_cases {
            pub mod execute_batch {
                pub mod batch;
                pub mod handler;
                pub mod validate;
            }
        }
        pub mod adapters {
            pub mod inbound {
                pub mod table_client;
            }
        }
    }
}

pub mod shell;
