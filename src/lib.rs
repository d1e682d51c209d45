pub mod shared {
    pub mod core {
        pub mod primitives;
    }
    pub mod infrastructure {
        pub mod key_value_store;
    }
}

pub mod modules {
    pub mod reviews {
        pub mod core {
            pub mod feed;
            pub mod ports;
            pub mod review;
            pub mod rotation;
        }
        pub mod use_cases {
            pub mod submit_review {
                pub mod handler;
            }
            pub mod resync_pending_reviews {
                pub mod handler;
                pub mod worker;
            }
            pub mod load_review_feed {
                pub mod handler;
            }
        }
        pub mod adapters {
            pub mod outbound {
                pub mod draft_store;
                pub mod review_api_http;
                pub mod review_api_in_memory;
            }
        }
    }
}

pub mod shell;
