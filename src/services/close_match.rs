use std::collections::HashMap;

/// Pre-indexed query side of the comparison
///
/// Built once per query and reused against every candidate.
pub struct SequenceMatcher {
    b: Vec<char>,
    /// char -> ascending positions in `b`, minus popular chars
    b2j: HashMap<char, Vec<usize>>,
    /// char -> number of occurrences in `b`
    b_counts: HashMap<char, usize>,
}

impl SequenceMatcher {
    pub fn new(b: &str) -> Self {
        let b: Vec<char> = b.chars().collect();
        let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, c) in b.iter().enumerate() {
            b2j.entry(*c).or_default().push(j);
        }
        let b_counts = b2j.iter().map(|(c, js)| (*c, js.len())).collect();

        // Long sequences: chars making up more than 1% of `b` are not used as
        // match anchors.
        let n = b.len();
        if n >= 200 {
            let ntest = n / 100 + 1;
            b2j.retain(|_, js| js.len() <= ntest);
        }

        Self { b, b2j, b_counts }
    }

    /// Upper bound on [`ratio`](Self::ratio) from lengths alone
    pub fn real_quick_ratio(&self, a: &[char]) -> f64 {
        let (la, lb) = (a.len(), self.b.len());
        calculate_ratio(la.min(lb), la + lb)
    }

    /// Upper bound on [`ratio`](Self::ratio) from shared character counts
    pub fn quick_ratio(&self, a: &[char]) -> f64 {
        let mut avail: HashMap<char, isize> = HashMap::new();
        let mut matches = 0;
        for c in a {
            let remaining = avail
                .entry(*c)
                .or_insert_with(|| self.b_counts.get(c).copied().unwrap_or(0) as isize);
            if *remaining > 0 {
                matches += 1;
            }
            *remaining -= 1;
        }
        calculate_ratio(matches, a.len() + self.b.len())
    }

    pub fn ratio(&self, a: &[char]) -> f64 {
        calculate_ratio(self.matching_chars(a), a.len() + self.b.len())
    }

    /// Total size of all matching blocks between `a` and `b`
    fn matching_chars(&self, a: &[char]) -> usize {
        let mut total = 0;
        let mut queue = vec![(0, a.len(), 0, self.b.len())];
        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let (i, j, k) = self.find_longest_match(a, alo, ahi, blo, bhi);
            if k == 0 {
                continue;
            }
            total += k;
            if alo < i && blo < j {
                queue.push((alo, i, blo, j));
            }
            if i + k < ahi && j + k < bhi {
                queue.push((i + k, ahi, j + k, bhi));
            }
        }
        total
    }

    /// Longest block `a[i..i+k] == b[j..j+k]` within the given bounds.
    /// Among equally long blocks the one starting earliest in `a`, then
    /// earliest in `b`, wins.
    fn find_longest_match(
        &self,
        a: &[char],
        alo: usize,
        ahi: usize,
        blo: usize,
        bhi: usize,
    ) -> (usize, usize, usize) {
        let b = &self.b;
        let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);

        // j2len[j] = length of the match ending at a[i - 1], b[j]
        let mut j2len: HashMap<usize, usize> = HashMap::new();
        for (i, c) in a.iter().enumerate().take(ahi).skip(alo) {
            let mut next: HashMap<usize, usize> = HashMap::new();
            if let Some(positions) = self.b2j.get(c) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j.checked_sub(1).and_then(|p| j2len.get(&p)).copied().unwrap_or(0) + 1;
                    next.insert(j, k);
                    if k > best_size {
                        best_i = i + 1 - k;
                        best_j = j + 1 - k;
                        best_size = k;
                    }
                }
            }
            j2len = next;
        }

        // Popular chars were never anchors; grow the block across them.
        while best_i > alo && best_j > blo && a[best_i - 1] == b[best_j - 1] {
            best_i -= 1;
            best_j -= 1;
            best_size += 1;
        }
        while best_i + best_size < ahi
            && best_j + best_size < bhi
            && a[best_i + best_size] == b[best_j + best_size]
        {
            best_size += 1;
        }

        (best_i, best_j, best_size)
    }
}

fn calculate_ratio(matches: usize, length: usize) -> f64 {
    if length == 0 {
        1.0
    } else {
        2.0 * matches as f64 / length as f64
    }
}

/// Gestalt (Ratcliff/Obershelp) similarity between two strings, in [0, 1].
///
/// The longest common block is found, then the regions to its left and right
/// are matched recursively. The ratio is `2 * M / (len(a) + len(b))` where `M`
/// is the number of matched characters, counted per Unicode scalar value.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    SequenceMatcher::new(b).ratio(&a)
}

/// The best `n` candidates whose ratio against `word` is at least `cutoff`,
/// best first. Equal ratios are ordered by descending candidate text.
pub fn get_close_matches<'a, I>(word: &str, candidates: I, n: usize, cutoff: f64) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    if n == 0 {
        return Vec::new();
    }

    let matcher = SequenceMatcher::new(word);
    let mut scored: Vec<(f64, &'a str)> = candidates
        .into_iter()
        .filter_map(|candidate| {
            let a: Vec<char> = candidate.chars().collect();
            if matcher.real_quick_ratio(&a) >= cutoff
                && matcher.quick_ratio(&a) >= cutoff
            {
                let score = matcher.ratio(&a);
                (score >= cutoff).then_some((score, candidate))
            } else {
                None
            }
        })
        .collect();

    scored.sort_by(|x, y| y.0.total_cmp(&x.0).then_with(|| y.1.cmp(x.1)));
    scored.truncate(n);
    scored.into_iter().map(|(_, candidate)| candidate).collect()
}
