/**
 * ItemKNN
 * Copyright (C) 2018 Sebastian Schelter
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program. If not, see <http://www.gnu.org/licenses/>.
 */

use std::time::Duration;

pub fn to_millis(duration: Duration) -> u64 {
    duration.as_secs() * 1000 + u64::from(duration.subsec_millis())
}

/// Splits `num_elements` into chunks so that each of `num_workers` gets several of them, which
/// evens out rows of very different cost.
pub fn chunk_size(num_elements: usize, num_workers: usize) -> usize {
    const CHUNKS_PER_WORKER: usize = 4;
    let num_chunks = num_workers.max(1) * CHUNKS_PER_WORKER;
    ((num_elements + num_chunks - 1) / num_chunks).max(1)
}


#[cfg(test)]
mod tests {

    use std::time::Duration;
    use crate::utils;

    #[test]
    fn millis() {
        assert_eq!(utils::to_millis(Duration::new(2, 5_000_000)), 2005);
    }

    #[test]
    fn chunks_cover_all_elements() {
        assert_eq!(utils::chunk_size(0, 4), 1);
        assert_eq!(utils::chunk_size(10, 1), 3);
        assert_eq!(utils::chunk_size(1000, 2), 125);
        assert_eq!(utils::chunk_size(7, 0), 2);
    }
}
