pub mod review_draft;
