use nohash_hasher::IntMap;

use crate::models::PeakList;

/// Intensity ranks of the peaks inside a mass window.
///
/// Rank 1 is the most intense peak; ties are broken by peak index so the
/// ranking is a strict order.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowRanking {
    min_mass: f64,
    max_mass: f64,
    first_index: usize,
    ranks: Vec<u32>,
}

impl WindowRanking {
    pub fn compute(peaks: &PeakList, min_mass: f64, max_mass: f64) -> Self {
        let range = peaks.index_range(min_mass, max_mass);
        let first_index = range.start;
        let window = &peaks.as_slice()[range];

        let mut order: Vec<usize> = (0..window.len()).collect();
        order.sort_by(|&a, &b| {
            window[b]
                .intensity
                .total_cmp(&window[a].intensity)
                .then(a.cmp(&b))
        });

        let mut ranks = vec![0u32; window.len()];
        for (rank, local) in order.into_iter().enumerate() {
            ranks[local] = rank as u32 + 1;
        }

        Self {
            min_mass,
            max_mass,
            first_index,
            ranks,
        }
    }

    /// Number of peaks in the window.
    pub fn population(&self) -> usize {
        self.ranks.len()
    }

    /// Rank of a peak, `None` when the peak lies outside the window.
    pub fn rank_of(&self, peak_index: usize) -> Option<u32> {
        peak_index
            .checked_sub(self.first_index)
            .and_then(|local| self.ranks.get(local).copied())
    }

    pub fn min_mass(&self) -> f64 {
        self.min_mass
    }

    pub fn max_mass(&self) -> f64 {
        self.max_mass
    }

    fn encloses(&self, min_mass: f64, max_mass: f64, slack: f64) -> bool {
        self.min_mass <= min_mass
            && self.max_mass >= max_mass
            && min_mass - self.min_mass <= slack
            && self.max_mass - max_mass <= slack
    }
}

fn window_key(floor: u64, ceil: u64) -> u64 {
    (floor << 32) | (ceil & 0xFFFF_FFFF)
}

/// Memoised window rankings for a single spectrum.
///
/// Windows are keyed by `(floor(min_mass), ceil(max_mass))`. When the exact
/// key has not been seen, any cached window that encloses the request and
/// overshoots each bound by at most `max(1 Da, 5% of the span)` is reused.
///
/// Which window a request lands on depends on what was cached before it, so
/// a cache is only valid for the peak list it was filled from and the
/// finder clears it before every root. That keeps scores independent of how
/// roots are scheduled across threads.
#[derive(Debug, Default)]
pub struct RankingCache {
    windows: Vec<WindowRanking>,
    by_key: IntMap<u64, usize>,
    by_floor: IntMap<u64, Vec<usize>>,
    hits: usize,
    misses: usize,
}

impl RankingCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_insert(&mut self, peaks: &PeakList, min_mass: f64, max_mass: f64) -> &WindowRanking {
        let floor = min_mass.floor().max(0.0) as u64;
        let ceil = max_mass.ceil().max(0.0) as u64;
        let key = window_key(floor, ceil);

        if let Some(&idx) = self.by_key.get(&key) {
            self.hits += 1;
            return &self.windows[idx];
        }

        if let Some(idx) = self.find_enclosing(min_mass, max_mass) {
            self.hits += 1;
            return &self.windows[idx];
        }

        self.misses += 1;
        let ranking = WindowRanking::compute(peaks, floor as f64, ceil as f64);
        let idx = self.windows.len();
        self.windows.push(ranking);
        self.by_key.insert(key, idx);
        self.by_floor.entry(floor).or_default().push(idx);
        &self.windows[idx]
    }

    fn find_enclosing(&self, min_mass: f64, max_mass: f64) -> Option<usize> {
        let slack = ((max_mass - min_mass) * 0.05).max(1.0);
        let lowest_floor = (min_mass - slack).floor().max(0.0) as u64;
        let highest_floor = min_mass.floor().max(0.0) as u64;

        (lowest_floor..=highest_floor)
            .filter_map(|floor| self.by_floor.get(&floor))
            .flatten()
            .copied()
            .filter(|&idx| self.windows[idx].encloses(min_mass, max_mass, slack))
            .min_by(|&a, &b| {
                let wa = self.windows[a].max_mass - self.windows[a].min_mass;
                let wb = self.windows[b].max_mass - self.windows[b].min_mass;
                wa.total_cmp(&wb).then(a.cmp(&b))
            })
    }

    /// Drops every cached window, keeping the allocations and the hit/miss
    /// counters.
    pub fn clear(&mut self) {
        self.windows.clear();
        self.by_key.clear();
        self.by_floor.clear();
    }

    /// Number of distinct windows ranked so far.
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }
}
