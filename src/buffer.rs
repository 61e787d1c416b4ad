/// Size of a cache line in bytes.
pub const CACHE_LINE_SIZE: usize = 64;

/// Number of independent lines loaded per step of [CacheLineBuffer::load_lines_strided].
pub const LINES_PER_STEP: usize = 8;

const WORDS_PER_LINE: usize = CACHE_LINE_SIZE / (u32::BITS as usize / 8);

/// One cache line worth of data.
#[repr(C)]
#[repr(align(64))]
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct CacheLine([u32; WORDS_PER_LINE]);

/// A cache line aligned buffer owned by an aggressor for the duration of its run.
///
/// Because every [CacheLine] is aligned on 64 bytes, touching a single word of a line is enough
/// to pull the whole line into the cache.
#[derive(Clone, Debug)]
pub struct CacheLineBuffer {
    cache_lines: Vec<CacheLine>,
}

impl CacheLineBuffer {
    /// Allocates a zeroed buffer of `bytes`, rounded down to whole cache lines (at least one).
    pub fn new(bytes: usize) -> Self {
        let n = (bytes / CACHE_LINE_SIZE).max(1);
        let cache_lines = vec![CacheLine::default(); n];
        Self { cache_lines }
    }

    /// Number of cache lines.
    pub fn len(&self) -> usize {
        self.cache_lines.len()
    }

    /// Always false, a buffer holds at least one line.
    pub fn is_empty(&self) -> bool {
        self.cache_lines.is_empty()
    }

    /// Size of the buffer in bytes.
    pub fn size_in_bytes(&self) -> usize {
        self.cache_lines.len() * CACHE_LINE_SIZE
    }

    /// Writes the running word index into every 32-bit word.
    ///
    /// This faults in every page so that the measured loop does not pay for first touches.
    pub fn fill_with_indices(&mut self) {
        let mut idx = 0u32;
        for line in self.cache_lines.iter_mut() {
            for word in line.0.iter_mut() {
                *word = idx;
                idx = idx.wrapping_add(1);
            }
        }
    }

    /// Copies the upper half of the buffer over the lower half.
    ///
    /// Returns the number of bytes copied.
    pub fn copy_upper_half_into_lower(&mut self) -> usize {
        let half = self.cache_lines.len() / 2;
        let (lower, upper) = self.cache_lines.split_at_mut(half);
        lower.copy_from_slice(&upper[..half]);
        std::hint::black_box(&mut *lower);
        half * CACHE_LINE_SIZE
    }

    /// Loads the first word of every cache line, [LINES_PER_STEP] independent lines per step.
    ///
    /// The loads are volatile and cannot be removed or hoisted by the optimizer. Trailing lines
    /// that do not fill a whole step are not loaded. Returns the number of loads issued.
    pub fn load_lines_strided(&self) -> u64 {
        let mut loads = 0u64;
        for step in self.cache_lines.chunks_exact(LINES_PER_STEP) {
            for line in step {
                // SAFETY: `line` is a reference into the live buffer.
                unsafe { std::ptr::read_volatile(&line.0[0]) };
            }
            loads += LINES_PER_STEP as u64;
        }
        loads
    }

    /// Loads per call of [Self::load_lines_strided].
    pub fn loads_per_pass(&self) -> u64 {
        (self.cache_lines.len() / LINES_PER_STEP * LINES_PER_STEP) as u64
    }

    #[cfg(test)]
    pub(crate) fn word(&self, idx: usize) -> u32 {
        self.cache_lines[idx / WORDS_PER_LINE].0[idx % WORDS_PER_LINE]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(unused_qualifications)]
    fn lines_are_aligned() {
        assert_eq!(std::mem::size_of::<CacheLine>(), CACHE_LINE_SIZE);
        assert_eq!(std::mem::align_of::<CacheLine>(), CACHE_LINE_SIZE);
        let buffer = CacheLineBuffer::new(4096);
        let addr = buffer.cache_lines.as_ptr() as usize;
        assert_eq!(addr % CACHE_LINE_SIZE, 0);
    }

    #[test]
    fn size_is_rounded_down_to_lines() {
        assert_eq!(CacheLineBuffer::new(4096).len(), 64);
        assert_eq!(CacheLineBuffer::new(4100).size_in_bytes(), 4096);
        assert_eq!(CacheLineBuffer::new(0).len(), 1);
        assert!(!CacheLineBuffer::new(0).is_empty());
    }

    #[test]
    fn fill_writes_indices() {
        let mut buffer = CacheLineBuffer::new(1024);
        buffer.fill_with_indices();
        for idx in [0, 1, 15, 16, 255] {
            assert_eq!(buffer.word(idx), idx as u32);
        }
    }

    #[test]
    fn copy_upper_half_into_lower() {
        let mut buffer = CacheLineBuffer::new(1024);
        buffer.fill_with_indices();
        let copied = buffer.copy_upper_half_into_lower();
        assert_eq!(copied, 512);
        // 256 words in total, the lower 128 now mirror the upper 128.
        for idx in 0..128 {
            assert_eq!(buffer.word(idx), buffer.word(idx + 128));
            assert_eq!(buffer.word(idx), (idx + 128) as u32);
        }
    }

    #[test]
    fn strided_loads_cover_whole_steps() {
        let buffer = CacheLineBuffer::new(64 * 20);
        assert_eq!(buffer.loads_per_pass(), 16);
        assert_eq!(buffer.load_lines_strided(), 16);

        let buffer = CacheLineBuffer::new(4096);
        assert_eq!(buffer.load_lines_strided(), 64);
    }
}
