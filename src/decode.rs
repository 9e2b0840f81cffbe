//! Decoding of the backend's fixed-capacity result buffer.

use crate::record::{Detection, DetectionTable, RawDetection, MAX_DETECTIONS, RESULT_CAPACITY};

/// Decode the backend's result buffer into a fixed-shape table.
///
/// `count` is the backend-reported number of valid slots. It is
/// clamped to `RESULT_CAPACITY` here, in the one entry point every
/// decode goes through, so a backend that over-reports can never cause
/// a read past the buffer.
///
/// Records are walked in the order the backend wrote them; no
/// re-sorting by score or position. The backend emits records in
/// non-increasing score order, so the first record scoring below
/// `score_threshold` ends decoding entirely. This is a truncation
/// contract, not a per-record filter: a later record that would pass
/// the threshold on its own is still dropped.
///
/// At most `MAX_DETECTIONS` records are accepted; rows past the
/// accepted count stay all-zero.
pub fn decode(
    records: &[RawDetection; RESULT_CAPACITY],
    count: u32,
    score_threshold: f32,
) -> DetectionTable {
    let valid = (count as usize).min(RESULT_CAPACITY);
    let mut table = DetectionTable::empty();

    for record in &records[..valid] {
        if record.score < score_threshold {
            break;
        }
        if table.accepted == MAX_DETECTIONS {
            break;
        }
        table.rows[table.accepted] = Detection::from(*record);
        table.accepted += 1;
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(score: f32, class: f32) -> RawDetection {
        RawDetection {
            ymin: 0.1,
            xmin: 0.2,
            ymax: 0.5,
            xmax: 0.6,
            score,
            object_class: class,
        }
    }

    fn buffer(records: &[RawDetection]) -> [RawDetection; RESULT_CAPACITY] {
        let mut out = [RawDetection::default(); RESULT_CAPACITY];
        out[..records.len()].copy_from_slice(records);
        out
    }

    #[test]
    fn zero_count_yields_all_zero_table() {
        let records = buffer(&[record(0.9, 1.0)]);
        let table = decode(&records, 0, 0.4);
        assert_eq!(table.accepted(), 0);
        assert!(table.rows().iter().all(Detection::is_zero));
    }

    #[test]
    fn stops_at_first_sub_threshold_score() {
        // 0.8 would pass on its own but comes after a sub-threshold
        // record, so it must be dropped.
        let records = buffer(&[
            record(0.9, 1.0),
            record(0.6, 2.0),
            record(0.3, 3.0),
            record(0.8, 4.0),
        ]);
        let table = decode(&records, 4, 0.4);
        assert_eq!(table.accepted(), 2);
        assert_eq!(table.rows()[0].class_id, 1.0);
        assert_eq!(table.rows()[1].class_id, 2.0);
        assert!(table.rows()[2].is_zero());
        assert!(table.rows()[3].is_zero());
    }

    #[test]
    fn accepts_at_most_max_detections() {
        let many: Vec<RawDetection> =
            (0..25).map(|i| record(0.9, i as f32)).collect();
        let records = buffer(&many);
        let table = decode(&records, 25, 0.4);
        assert_eq!(table.accepted(), MAX_DETECTIONS);
        assert_eq!(table.rows()[MAX_DETECTIONS - 1].class_id, 19.0);
    }

    #[test]
    fn clamps_count_to_capacity() {
        let records = buffer(&[record(0.9, 1.0), record(0.85, 2.0)]);
        // Backend over-reports; decode must stay inside the buffer.
        let table = decode(&records, (RESULT_CAPACITY + 5) as u32, 0.4);
        // Only the two real records score above threshold; the rest of
        // the buffer is zeroed so decoding stops there.
        assert_eq!(table.accepted(), 2);
    }

    #[test]
    fn row_fields_are_bit_exact_copies() {
        let records = buffer(&[RawDetection {
            ymin: 0.1,
            xmin: 0.2,
            ymax: 0.5,
            xmax: 0.6,
            score: 0.95,
            object_class: 3.0,
        }]);
        let table = decode(&records, 1, 0.4);
        let row = table.rows()[0];
        assert_eq!(row.class_id, 3.0);
        assert_eq!(row.score, 0.95);
        assert_eq!(row.ymin, 0.1);
        assert_eq!(row.xmin, 0.2);
        assert_eq!(row.ymax, 0.5);
        assert_eq!(row.xmax, 0.6);
    }

    #[test]
    fn threshold_is_exclusive_below_only() {
        // A score exactly at the threshold is accepted.
        let records = buffer(&[record(0.4, 1.0), record(0.39, 2.0)]);
        let table = decode(&records, 2, 0.4);
        assert_eq!(table.accepted(), 1);
    }
}
