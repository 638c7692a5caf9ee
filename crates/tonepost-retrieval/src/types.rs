use tonepost_core::Tone;

/// A reference caption retrieved from the exemplar corpus.
///
/// Exemplars are style/rhythm references only; they are shown to the
/// generative model but never copied into output.
#[derive(Debug, Clone)]
pub struct ExemplarCaption {
    /// The caption text.
    pub text: String,
    /// Business category the caption was collected for.
    pub category: String,
    /// Tone label assigned at ingestion time, if any.
    pub tone: Option<Tone>,
    /// Popularity count (likes/saves) at collection time.
    pub popularity: u32,
    /// Cosine similarity to the query vector, set at query time.
    pub similarity: f32,
    /// Stable identity of the source post, used as the corpus dedup key.
    pub source_id: String,
}
