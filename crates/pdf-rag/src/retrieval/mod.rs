//! Vector index, corpus construction, and context retrieval

mod corpus;
mod index;
mod retriever;

pub use corpus::{Corpus, CorpusManager, SessionCorpus};
pub use index::{FlatL2Index, Neighbor};
pub use retriever::{retrieve_context, RetrievedChunk, RetrievedContext, Retriever, CONTEXT_SEPARATOR};
