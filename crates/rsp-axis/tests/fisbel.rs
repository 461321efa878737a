use std::f64::consts::PI;

use proptest::prelude::*;
use rsp_axis::FisbelBinning;

#[test]
fn four_cells_form_caps_and_one_collar() {
    let binning = FisbelBinning::new(4).unwrap();
    assert_eq!(binning.longitude_bins(), &[1, 2, 1]);
    assert_eq!(binning.bin_count(), 4);
    let edges = binning.latitude_edges();
    assert!((edges[1] - PI / 3.0).abs() < 1e-12);
    assert!((edges[2] - 2.0 * PI / 3.0).abs() < 1e-12);
}

#[test]
fn eight_cells_split_at_the_equator() {
    let binning = FisbelBinning::new(8).unwrap();
    assert_eq!(binning.longitude_bins(), &[1, 3, 3, 1]);
    assert!((binning.latitude_edges()[2] - PI / 2.0).abs() < 1e-9);
}

#[test]
fn single_cell_covers_the_sphere() {
    let binning = FisbelBinning::new(1).unwrap();
    assert_eq!(binning.bin_count(), 1);
    assert_eq!(binning.find_bin(1.0, 1.0), Some(0));
    assert!((binning.solid_angle(0) - 4.0 * PI).abs() < 1e-12);
}

#[test]
fn zero_cells_fail() {
    assert_eq!(FisbelBinning::new(0).unwrap_err().code(), "zero-bins");
}

#[test]
fn poles_and_out_of_range_latitudes() {
    let binning = FisbelBinning::new(100).unwrap();
    assert_eq!(binning.find_bin(3.0, 0.0), Some(0));
    assert_eq!(binning.find_bin(3.0, PI), Some(binning.bin_count() - 1));
    assert_eq!(binning.find_bin(0.0, -0.1), None);
    assert_eq!(binning.find_bin(0.0, PI + 0.1), None);
    assert_eq!(binning.find_bin(f64::NAN, 1.0), None);
}

#[test]
fn longitude_wraps_around() {
    let binning = FisbelBinning::new(4).unwrap();
    let east = binning.find_bin(0.5 * PI, 0.5 * PI).unwrap();
    let wrapped = binning.find_bin(0.5 * PI + 2.0 * PI, 0.5 * PI).unwrap();
    let negative = binning.find_bin(0.5 * PI - 2.0 * PI, 0.5 * PI).unwrap();
    assert_eq!(east, 1);
    assert_eq!(wrapped, east);
    assert_eq!(negative, east);
    assert_eq!(binning.find_bin(1.5 * PI, 0.5 * PI), Some(2));
}

#[test]
fn shift_moves_the_longitude_origin() {
    let plain = FisbelBinning::new(4).unwrap();
    let shifted = FisbelBinning::with_shift(4, PI).unwrap();
    assert_eq!(plain.find_bin(0.5 * PI, 0.5 * PI), Some(1));
    assert_eq!(shifted.find_bin(0.5 * PI, 0.5 * PI), Some(2));
    assert_ne!(plain, shifted);
}

proptest! {
    #[test]
    fn solid_angles_cover_the_sphere(bins in 1usize..400) {
        let binning = FisbelBinning::new(bins).unwrap();
        let total: f64 = (0..binning.bin_count()).map(|bin| binning.solid_angle(bin)).sum();
        prop_assert!((total - 4.0 * PI).abs() < 1e-6);
        prop_assert_eq!(binning.longitude_bins().iter().sum::<usize>(), binning.bin_count());
    }

    #[test]
    fn lookups_stay_inside_the_partition(
        bins in 1usize..400,
        longitude in -10.0f64..10.0,
        latitude in 0.0f64..=PI,
    ) {
        let binning = FisbelBinning::new(bins).unwrap();
        let bin = binning.find_bin(longitude, latitude).unwrap();
        prop_assert!(bin < binning.bin_count());
    }

    #[test]
    fn bin_centers_map_back(bins in 1usize..200) {
        let binning = FisbelBinning::new(bins).unwrap();
        for bin in 0..binning.bin_count() {
            let (longitude, latitude) = binning.bin_center(bin);
            prop_assert_eq!(binning.find_bin(longitude, latitude), Some(bin));
        }
    }
}
