//! Proptest generators for property-based testing.

use bytes::Bytes;
use proptest::prelude::*;

use hashvault::SubmitRequest;
use hashvault_core::{SubmissionId, ID_ENTROPY_BYTES};

/// Generate upload bytes of at most `max_len`.
pub fn payload(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

/// Generate a team name.
pub fn team_name() -> impl Strategy<Value = String> {
    "[A-Z][A-Z0-9_]{0,15}".prop_map(String::from)
}

/// Generate a filename with an accepted extension.
pub fn filename() -> impl Strategy<Value = String> {
    (
        "[a-z][a-z0-9_-]{0,15}",
        prop::sample::select(vec!["txt", "pdf", "png", "zip", "json", "md", "csv"]),
    )
        .prop_map(|(stem, ext)| format!("{stem}.{ext}"))
}

/// Generate a well-formed submission id.
pub fn submission_id() -> impl Strategy<Value = SubmissionId> {
    any::<[u8; ID_ENTROPY_BYTES]>().prop_map(|bytes| SubmissionId::from_entropy(&bytes))
}

/// Generate `data` together with random cut points.
pub fn chunked_payload(max_len: usize) -> impl Strategy<Value = (Vec<u8>, Vec<Bytes>)> {
    payload(max_len).prop_flat_map(|data| {
        let len = data.len();
        prop::collection::vec(0..=len, 0..8).prop_map(move |mut cuts| {
            cuts.sort_unstable();
            (data.clone(), split_at(&data, &cuts))
        })
    })
}

/// Split `data` at the sorted offsets in `cuts`.
pub fn split_at(data: &[u8], cuts: &[usize]) -> Vec<Bytes> {
    let mut chunks = Vec::with_capacity(cuts.len() + 1);
    let mut start = 0;
    for &cut in cuts {
        chunks.push(Bytes::copy_from_slice(&data[start..cut]));
        start = cut;
    }
    chunks.push(Bytes::copy_from_slice(&data[start..]));
    chunks
}

/// Parameters for one submit.
#[derive(Debug, Clone)]
pub struct SubmitParams {
    pub team: String,
    pub filename: String,
    pub payload: Vec<u8>,
}

impl SubmitParams {
    pub fn request(&self) -> SubmitRequest {
        SubmitRequest::new(self.team.clone(), self.filename.clone())
    }
}

impl Arbitrary for SubmitParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (team_name(), filename(), payload(4096))
            .prop_map(|(team, filename, payload)| SubmitParams {
                team,
                filename,
                payload,
            })
            .boxed()
    }
}
