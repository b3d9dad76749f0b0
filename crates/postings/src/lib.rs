//! Postings domain module.
//!
//! Business rules for internship postings, implemented purely as deterministic
//! domain logic (no IO, no HTTP, no storage).

pub mod posting;

pub use posting::{
    Posting, PostingDetails, PostingDraft, PostingPatch, PostingStatus, PostingSummary, WorkMode,
};
