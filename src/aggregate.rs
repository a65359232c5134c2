/// Page copies taken from one source document, split by index parity
#[derive(Debug, Clone)]
pub struct SourcePages<P> {
    pub odd: Vec<P>,
    pub even: Vec<P>,
}

/// All pages destined for the two output documents, in final order
#[derive(Debug, Clone)]
pub struct OutputPages<P> {
    pub odd: Vec<P>,
    pub even: Vec<P>,
}

impl<P> Default for OutputPages<P> {
    fn default() -> Self {
        OutputPages {
            odd: Vec::new(),
            even: Vec::new(),
        }
    }
}

/// Concatenate per-source buckets in the order the sources are given.
///
/// `sources` must already be in listing order; nothing here looks at
/// when a source finished processing.
pub fn aggregate<P>(sources: impl IntoIterator<Item = SourcePages<P>>) -> OutputPages<P> {
    sources
        .into_iter()
        .fold(OutputPages::default(), |mut all, source| {
            all.odd.extend(source.odd);
            all.even.extend(source.even);
            all
        })
}
