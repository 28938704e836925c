//! Topic discovery: filtered lines → ranked topic descriptors.
//!
//! The clustering backend sits behind the [`TopicModel`] trait. The default
//! implementation, [`TermClusterModel`], is a small deterministic
//! term-clustering model:
//!
//! 1. **Vectorize** — lowercase tokenization, English stop words removed,
//!    features are surviving unigrams plus bigrams of adjacent surviving
//!    tokens; per-line sparse TF-IDF vectors, L2-normalized.
//! 2. **Cluster** — centroid-based iterative refinement over cosine
//!    similarity, seeded by deterministic farthest-point selection and
//!    targeting about six clusters (fewer may survive). Lines with no
//!    features, lines matching no centroid, and members of sub-minimum
//!    clusters land in the outlier bucket (id −1).
//! 3. **Label** — each cluster is named from its top representative terms,
//!    `<id>_<term>_<term>_…`, ranked by summed in-cluster TF-IDF mass.
//!
//! The fitted summary table lists the outlier bucket first (id −1), then
//! real topics with ids assigned 0, 1, 2, … by descending member count, so
//! ascending-id order *is* prevalence order. [`discover_topics`] drops the
//! outlier row and keeps at most [`MAX_TOPIC_DESCRIPTORS`] rows, in table
//! order, without re-sorting.
//!
//! Everything here is single-threaded by construction: one fit, one thread,
//! no internal worker pool.

use crate::error::TopicModelError;
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Cluster id reserved for lines that fit no coherent theme.
pub const OUTLIER_TOPIC_ID: i32 = -1;

/// Upper bound on descriptors surfaced to the prompt.
pub const MAX_TOPIC_DESCRIPTORS: usize = 5;

/// One row of the fitted model's summary table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicSummary {
    /// −1 for the outlier bucket, otherwise 0, 1, 2, … in prevalence order.
    pub id: i32,
    /// Member line count.
    pub size: usize,
    /// Label composed of the topic's top representative terms.
    pub name: String,
}

/// A kept topic after outlier exclusion and truncation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicDescriptor {
    pub id: i32,
    pub name: String,
}

/// An unsupervised topic-clustering backend.
pub trait TopicModel: Send + Sync {
    /// Fit the model over the line sequence and return its summary table.
    fn fit(&self, lines: &[String]) -> Result<Vec<TopicSummary>, TopicModelError>;
}

/// Select the reportable descriptors from a fitted model.
///
/// Excludes the outlier bucket and keeps at most
/// [`MAX_TOPIC_DESCRIPTORS`] rows in the model's own ranking order.
pub fn discover_topics(
    model: &dyn TopicModel,
    lines: &[String],
) -> Result<Vec<TopicDescriptor>, TopicModelError> {
    let table = model.fit(lines)?;
    let descriptors: Vec<TopicDescriptor> = table
        .into_iter()
        .filter(|row| row.id != OUTLIER_TOPIC_ID)
        .take(MAX_TOPIC_DESCRIPTORS)
        .map(|row| TopicDescriptor {
            id: row.id,
            name: row.name,
        })
        .collect();
    debug!("keeping {} topic descriptor(s)", descriptors.len());
    Ok(descriptors)
}

// ── Default model ────────────────────────────────────────────────────────

/// Deterministic TF-IDF term-clustering model.
#[derive(Debug, Clone)]
pub struct TermClusterModel {
    /// Cluster-count target; the fitted model may hold fewer.
    pub target_topics: usize,
    /// A line whose best centroid similarity is not above this floor is an
    /// outlier.
    pub similarity_floor: f32,
    /// Clusters smaller than this fold into the outlier bucket.
    pub min_cluster_size: usize,
    /// How many representative terms make up a topic label.
    pub label_terms: usize,
}

impl Default for TermClusterModel {
    fn default() -> Self {
        Self {
            target_topics: 6,
            similarity_floor: 0.0,
            min_cluster_size: 2,
            label_terms: 4,
        }
    }
}

/// Common English function words, excluded from the vocabulary.
static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "the", "and", "for", "are", "was", "were", "been", "being", "has", "had", "have",
        "does", "did", "will", "would", "could", "should", "may", "might", "must", "shall",
        "can", "not", "but", "its", "his", "her", "our", "their", "your", "into", "onto",
        "over", "under", "about", "between", "through", "during", "before", "after", "above",
        "below", "from", "with", "within", "without", "each", "every", "both", "few", "more",
        "most", "other", "some", "such", "only", "than", "too", "very", "also", "just",
        "then", "once", "here", "there", "when", "where", "why", "how", "all", "any", "nor",
        "this", "that", "these", "those", "what", "which", "who", "whom", "whose", "you",
        "she", "him", "they", "them", "because", "until", "while", "against", "again",
        "further", "off", "out", "own", "same", "down",
    ]
    .into_iter()
    .collect()
});

/// Sparse L2-normalized term vector, sorted by term index.
type SparseVec = Vec<(u32, f32)>;

impl TopicModel for TermClusterModel {
    fn fit(&self, lines: &[String]) -> Result<Vec<TopicSummary>, TopicModelError> {
        if lines.is_empty() {
            return Err(TopicModelError::NotEnoughLines { got: 0 });
        }

        let features: Vec<Vec<String>> = lines.iter().map(|l| line_features(l)).collect();

        // Vocabulary and document frequencies.
        let mut vocab: HashMap<&str, u32> = HashMap::new();
        let mut doc_freq: HashMap<u32, usize> = HashMap::new();
        for feats in &features {
            let mut seen: HashSet<u32> = HashSet::new();
            for term in feats {
                let next_id = vocab.len() as u32;
                let id = *vocab.entry(term.as_str()).or_insert(next_id);
                if seen.insert(id) {
                    *doc_freq.entry(id).or_insert(0) += 1;
                }
            }
        }
        if vocab.is_empty() {
            return Err(TopicModelError::EmptyVocabulary);
        }
        let terms_by_id: HashMap<u32, &str> = vocab.iter().map(|(t, &i)| (i, *t)).collect();

        // Per-line TF-IDF vectors.
        let n_lines = lines.len() as f32;
        let vectors: Vec<SparseVec> = features
            .iter()
            .map(|feats| {
                let mut counts: HashMap<u32, f32> = HashMap::new();
                for term in feats {
                    *counts.entry(vocab[term.as_str()]).or_insert(0.0) += 1.0;
                }
                let mut vec: SparseVec = counts
                    .into_iter()
                    .map(|(id, tf)| {
                        let idf = (n_lines / (1.0 + doc_freq[&id] as f32)).ln() + 1.0;
                        (id, tf * idf)
                    })
                    .collect();
                vec.sort_unstable_by_key(|&(id, _)| id);
                normalize(&mut vec);
                vec
            })
            .collect();

        // Lines with no surviving features start in the outlier bucket.
        let vectorized: Vec<usize> = (0..lines.len()).filter(|&i| !vectors[i].is_empty()).collect();
        let mut outliers: Vec<usize> = (0..lines.len()).filter(|&i| vectors[i].is_empty()).collect();

        let mut clusters = self.cluster(&vectors, &vectorized, &mut outliers);

        // Fold sub-minimum clusters into the outlier bucket.
        clusters.retain(|members| {
            if members.len() < self.min_cluster_size {
                outliers.extend_from_slice(members);
                false
            } else {
                true
            }
        });

        // Prevalence ranking: descending size, first-member index as the
        // deterministic tie-break.
        clusters.sort_by_key(|m| (std::cmp::Reverse(m.len()), m.first().copied()));

        let mut table = Vec::with_capacity(clusters.len() + 1);
        table.push(TopicSummary {
            id: OUTLIER_TOPIC_ID,
            size: outliers.len(),
            name: self.label(OUTLIER_TOPIC_ID, &outliers, &vectors, &terms_by_id),
        });
        for (rank, members) in clusters.iter().enumerate() {
            let id = rank as i32;
            table.push(TopicSummary {
                id,
                size: members.len(),
                name: self.label(id, members, &vectors, &terms_by_id),
            });
        }
        debug!(
            "fitted {} topic(s) plus {} outlier line(s)",
            table.len() - 1,
            outliers.len()
        );
        Ok(table)
    }
}

impl TermClusterModel {
    /// Centroid refinement over the vectorized lines. Lines whose best
    /// similarity never clears the floor are appended to `outliers`.
    fn cluster(
        &self,
        vectors: &[SparseVec],
        vectorized: &[usize],
        outliers: &mut Vec<usize>,
    ) -> Vec<Vec<usize>> {
        let k = self.target_topics.min(vectorized.len());
        if k == 0 {
            return Vec::new();
        }

        let mut centroids: Vec<SparseVec> = seed_centroids(vectors, vectorized, k);
        let mut assignment: Vec<Option<usize>> = vec![None; vectorized.len()];

        for _round in 0..20 {
            let mut changed = false;

            for (slot, &line_idx) in vectorized.iter().enumerate() {
                let mut best: Option<(usize, f32)> = None;
                for (c, centroid) in centroids.iter().enumerate() {
                    let sim = dot(&vectors[line_idx], centroid);
                    if best.map_or(true, |(_, b)| sim > b) {
                        best = Some((c, sim));
                    }
                }
                let next = match best {
                    Some((c, sim)) if sim > self.similarity_floor => Some(c),
                    _ => None,
                };
                if next != assignment[slot] {
                    assignment[slot] = next;
                    changed = true;
                }
            }
            if !changed {
                break;
            }

            for (c, centroid) in centroids.iter_mut().enumerate() {
                let members: Vec<usize> = vectorized
                    .iter()
                    .enumerate()
                    .filter(|(slot, _)| assignment[*slot] == Some(c))
                    .map(|(_, &idx)| idx)
                    .collect();
                if !members.is_empty() {
                    *centroid = mean_vector(vectors, &members);
                }
            }
        }

        let mut clusters: Vec<Vec<usize>> = vec![Vec::new(); k];
        for (slot, &line_idx) in vectorized.iter().enumerate() {
            match assignment[slot] {
                Some(c) => clusters[c].push(line_idx),
                None => outliers.push(line_idx),
            }
        }
        clusters.retain(|m| !m.is_empty());
        clusters
    }

    /// Label a cluster from its top terms by summed TF-IDF mass.
    fn label(
        &self,
        id: i32,
        members: &[usize],
        vectors: &[SparseVec],
        terms_by_id: &HashMap<u32, &str>,
    ) -> String {
        let mut mass: HashMap<u32, f32> = HashMap::new();
        for &line_idx in members {
            for &(term, w) in &vectors[line_idx] {
                *mass.entry(term).or_insert(0.0) += w;
            }
        }
        let mut ranked: Vec<(u32, f32)> = mass.into_iter().collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| terms_by_id[&a.0].cmp(terms_by_id[&b.0]))
        });

        let mut parts = vec![id.to_string()];
        parts.extend(
            ranked
                .iter()
                .take(self.label_terms)
                .map(|&(term, _)| terms_by_id[&term].replace(' ', "_")),
        );
        parts.join("_")
    }
}

/// Tokenize a line into vocabulary features: stop-worded unigrams plus
/// bigrams of adjacent surviving tokens.
fn line_features(line: &str) -> Vec<String> {
    let tokens: Vec<String> = line
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric() && c != '\'')
        .map(|t| t.trim_matches('\'').to_string())
        .filter(|t| {
            t.len() >= 3
                && t.len() <= 25
                && !t.chars().all(|c| c.is_numeric())
                && !STOP_WORDS.contains(t.as_str())
        })
        .collect();

    let mut features = tokens.clone();
    for pair in tokens.windows(2) {
        features.push(format!("{} {}", pair[0], pair[1]));
    }
    features
}

/// Farthest-point seeding: start from the first vectorized line, then
/// repeatedly pick the line least similar to any chosen seed.
fn seed_centroids(vectors: &[SparseVec], vectorized: &[usize], k: usize) -> Vec<SparseVec> {
    let mut seeds: Vec<usize> = vec![vectorized[0]];
    while seeds.len() < k {
        let next = vectorized
            .iter()
            .copied()
            .filter(|idx| !seeds.contains(idx))
            .map(|idx| {
                let closest = seeds
                    .iter()
                    .map(|&s| dot(&vectors[idx], &vectors[s]))
                    .fold(f32::NEG_INFINITY, f32::max);
                (idx, closest)
            })
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        match next {
            Some((idx, _)) => seeds.push(idx),
            None => break,
        }
    }
    seeds.into_iter().map(|idx| vectors[idx].clone()).collect()
}

fn normalize(vec: &mut SparseVec) {
    let norm = vec.iter().map(|&(_, w)| w * w).sum::<f32>().sqrt();
    if norm > 0.0 {
        for (_, w) in vec.iter_mut() {
            *w /= norm;
        }
    }
}

/// Dot product of two sorted sparse vectors.
fn dot(a: &SparseVec, b: &SparseVec) -> f32 {
    let (mut i, mut j, mut sum) = (0, 0, 0.0);
    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                sum += a[i].1 * b[j].1;
                i += 1;
                j += 1;
            }
        }
    }
    sum
}

/// L2-normalized mean of the member vectors.
fn mean_vector(vectors: &[SparseVec], members: &[usize]) -> SparseVec {
    let mut acc: HashMap<u32, f32> = HashMap::new();
    for &idx in members {
        for &(term, w) in &vectors[idx] {
            *acc.entry(term).or_insert(0.0) += w;
        }
    }
    let mut mean: SparseVec = acc
        .into_iter()
        .map(|(term, w)| (term, w / members.len() as f32))
        .collect();
    mean.sort_unstable_by_key(|&(id, _)| id);
    normalize(&mut mean);
    mean
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|s| s.to_string()).collect()
    }

    /// Three clearly separated vocabularies, four lines each.
    fn themed_corpus() -> Vec<String> {
        lines(&[
            "apple orchards produce sweet apple cider every autumn",
            "cider presses crush apple harvests in the orchard barn",
            "orchard workers sort apple crates near the cider press",
            "autumn apple festivals celebrate the orchard cider season",
            "rust compiler enforces memory safety through borrow checking",
            "the borrow checker rejects unsafe memory aliasing in rust",
            "rust programs compile to fast native machine code",
            "memory safety bugs vanish under the rust compiler rules",
            "telescopes capture distant galaxies across the night sky",
            "astronomers chart galaxy clusters with orbital telescopes",
            "the night sky reveals spiral galaxies to patient telescopes",
            "galaxy surveys map the universe with wide telescopes",
        ])
    }

    #[test]
    fn descriptors_exclude_outlier_and_cap_at_five() {
        let model = TermClusterModel::default();
        let descriptors = discover_topics(&model, &themed_corpus()).unwrap();
        assert!(!descriptors.is_empty());
        assert!(descriptors.len() <= MAX_TOPIC_DESCRIPTORS);
        assert!(descriptors.iter().all(|d| d.id != OUTLIER_TOPIC_ID));
    }

    #[test]
    fn table_lists_outlier_first_then_prevalence_order() {
        let model = TermClusterModel::default();
        let table = model.fit(&themed_corpus()).unwrap();
        assert_eq!(table[0].id, OUTLIER_TOPIC_ID);
        let sizes: Vec<usize> = table[1..].iter().map(|row| row.size).collect();
        let mut sorted = sizes.clone();
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        assert_eq!(sizes, sorted, "topics must rank by descending size");
        for (rank, row) in table[1..].iter().enumerate() {
            assert_eq!(row.id, rank as i32);
        }
    }

    #[test]
    fn labels_carry_representative_terms() {
        let model = TermClusterModel::default();
        let descriptors = discover_topics(&model, &themed_corpus()).unwrap();
        let joined: String = descriptors
            .iter()
            .map(|d| d.name.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let distinctive = ["apple", "rust", "telescopes", "galaxy", "cider", "memory"];
        assert!(
            distinctive.iter().any(|t| joined.contains(t)),
            "no distinctive term in labels: {joined}"
        );
        for d in &descriptors {
            assert!(
                d.name.starts_with(&format!("{}_", d.id)),
                "label must lead with the topic id: {}",
                d.name
            );
        }
    }

    #[test]
    fn stop_word_only_lines_fail_with_empty_vocabulary() {
        let model = TermClusterModel::default();
        let result = model.fit(&lines(&[
            "the and for with are was were",
            "this that these those which what",
            "should would could must might may",
            "into over under about during after",
            "because until while against again",
        ]));
        assert_eq!(result.unwrap_err(), TopicModelError::EmptyVocabulary);
    }

    #[test]
    fn numeric_only_lines_fail_with_empty_vocabulary() {
        let model = TermClusterModel::default();
        let result = model.fit(&lines(&["1234 5678 90123", "44 55 66 77 88 99"]));
        assert_eq!(result.unwrap_err(), TopicModelError::EmptyVocabulary);
    }

    #[test]
    fn no_lines_is_an_error() {
        let model = TermClusterModel::default();
        assert_eq!(
            model.fit(&[]).unwrap_err(),
            TopicModelError::NotEnoughLines { got: 0 }
        );
    }

    #[test]
    fn fitting_is_deterministic() {
        let model = TermClusterModel::default();
        let corpus = themed_corpus();
        assert_eq!(model.fit(&corpus).unwrap(), model.fit(&corpus).unwrap());
    }

    #[test]
    fn bigrams_join_surviving_tokens() {
        let features = line_features("the quick compiler and the parser");
        assert!(features.contains(&"quick".to_string()));
        assert!(features.contains(&"compiler".to_string()));
        // "and"/"the" are stop words, so the bigram bridges across them.
        assert!(features.contains(&"quick compiler".to_string()));
        assert!(features.contains(&"compiler parser".to_string()));
    }

    #[test]
    fn more_topics_than_target_never_fitted() {
        // 30 lines of pairwise-distinct vocabulary still collapse into at
        // most the target count (plus outliers).
        let many: Vec<String> = (0..30)
            .map(|i| format!("subject{i} theme{i} motif{i} subject{i} detail{i}"))
            .collect();
        let model = TermClusterModel::default();
        let table = model.fit(&many).unwrap();
        assert!(table.len() - 1 <= model.target_topics);
    }
}
