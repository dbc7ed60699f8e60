use nalgebra::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};
use approx::assert_relative_eq;
use discern::*;
use discern::sample::load_reader;
use discern::tree::NodeKind;
use discern::validate::{self, ValidationConfig};

const N_PER_CLASS : usize = 50;

// Three well-separated spherical Gaussian clouds in the plane, sorted by class. When
// constant is informed, a third column holding that value is appended, which makes
// every class covariance singular.
fn gaussian_clouds(seed : u64, constant : Option<f64>) -> Dataset {
    let means = [(0., 0.), (10., 0.), (0., 10.)];
    let noise = Normal::new(0., 1.).unwrap();
    let mut rng = StdRng::seed_from_u64(seed);
    let n_fields = if constant.is_some() { 3 } else { 2 };
    let mut values = Vec::new();
    let mut labels = Vec::new();
    for (i, (mx, my)) in means.iter().enumerate() {
        for _ in 0..N_PER_CLASS {
            values.push(mx + noise.sample(&mut rng));
            values.push(my + noise.sample(&mut rng));
            if let Some(c) = constant {
                values.push(c);
            }
            labels.push(i + 1);
        }
    }
    let features = DMatrix::from_row_slice(labels.len(), n_fields, &values[..]);
    Dataset::new(features, labels, means.len()).unwrap()
}

// The classic weather/play table: outlook (sunny, overcast, rain), temperature
// (hot, mild, cool), humidity (high, normal), wind (weak, strong); 1 = no, 2 = yes.
fn weather() -> Dataset {
    let rows : [[f64; 5]; 14] = [
        [0., 0., 0., 0., 1.],
        [0., 0., 0., 1., 1.],
        [1., 0., 0., 0., 2.],
        [2., 1., 0., 0., 2.],
        [2., 2., 1., 0., 2.],
        [2., 2., 1., 1., 1.],
        [1., 2., 1., 1., 2.],
        [0., 1., 0., 0., 1.],
        [0., 2., 1., 0., 2.],
        [2., 1., 1., 0., 2.],
        [0., 1., 1., 1., 2.],
        [1., 1., 0., 1., 2.],
        [1., 0., 1., 0., 2.],
        [2., 1., 0., 1., 1.]
    ];
    let features = DMatrix::from_fn(rows.len(), 4, |i, j| rows[i][j] );
    let labels = rows.iter().map(|r| r[4] as Label ).collect();
    Dataset::new(features, labels, 2).unwrap()
}

#[test]
fn discriminants_separate_gaussian_clouds() {
    let data = gaussian_clouds(1, None);
    for kind in [ClassifierKind::Optimal, ClassifierKind::Naive, ClassifierKind::Linear].iter() {
        let report = validate::k_fold(&data, *kind, 10).unwrap();
        assert_eq!(report.folds.len(), 10);
        assert_eq!(report.total.total(), data.len());
        assert_eq!(report.total.undecided, 0);
        assert!(report.total.accuracy() > 0.9, "{}", report);
    }
}

#[test]
fn constant_feature_uses_pseudo_inverse() {
    let data = gaussian_clouds(2, Some(1.5));
    let config = ValidationConfig::new().with_folds(5).with_seed(11);
    for kind in [ClassifierKind::Optimal, ClassifierKind::Naive].iter() {
        let report = validate::cross_validate(&data, *kind, &config, |_| { }).unwrap();
        assert!(report.total.accuracy() > 0.9, "{}", report);
    }
    let clf = data.classifier(ClassifierKind::Optimal).unwrap();
    assert_eq!(clf.classify(&[0.2, -0.3, 1.5]), Outcome::Label(1));
    assert_eq!(clf.classify(&[9.5, 0.4, 1.5]), Outcome::Label(2));
    assert_eq!(clf.classify(&[-0.1, 10.2, 1.5]), Outcome::Label(3));
}

#[test]
fn discriminant_models_follow_class_statistics() {
    let data = gaussian_clouds(3, None);
    let clf = data.classifier(ClassifierKind::Linear).unwrap();
    let disc = match clf {
        Classifier::Discriminant(d) => d,
        Classifier::Tree(_) => panic!("Expected a discriminant")
    };
    assert_eq!(disc.n_classes(), 3);
    for label in 1..=3 {
        let model = disc.model(label).unwrap();
        let class = data.subset_by_class(label).unwrap();
        assert_relative_eq!(model.mean(), &class.means(), epsilon = 1E-12);
        assert_eq!(model.sigma_inv(), &DMatrix::<f64>::identity(2, 2));
        assert_eq!(model.sigma_det(), 1.0);
    }
}

#[test]
fn weather_tree_splits_on_outlook() {
    let data = weather();
    let clf = data.classifier(ClassifierKind::DecisionTree).unwrap();
    let tree = clf.as_tree().unwrap();
    assert_eq!(tree.node(tree.root()).kind, NodeKind::Split { attribute : 0 });
    assert_relative_eq!(tree.node(tree.root()).entropy, 0.9402859586706309, epsilon = 1E-12);
    assert_eq!(tree.node_count(), 8);
    assert_eq!(tree.leaves().count(), 5);
    assert_eq!(tree.depth(), 2);

    // Sunny days branch on humidity and rainy days on wind.
    let mut split_attrs : Vec<usize> = tree.children(tree.root())
        .iter()
        .filter_map(|(_, c)| match tree.node(*c).kind {
            NodeKind::Split { attribute } => Some(attribute),
            NodeKind::Leaf { .. } => None
        })
        .collect();
    split_attrs.sort();
    assert_eq!(split_attrs, vec![2, 3]);

    for i in 0..data.len() {
        assert_eq!(clf.classify(&data.point(i)), Outcome::Label(data.label(i)));
    }
    assert_eq!(clf.classify(&[1., 2., 0., 1.]), Outcome::Label(2));
    assert_eq!(clf.classify(&[3., 0., 0., 0.]), Outcome::Undecided);
}

#[test]
fn weather_leave_one_out_accounts_for_every_row() {
    let data = weather();
    let report = validate::leave_one_out(&data, ClassifierKind::DecisionTree).unwrap();
    assert_eq!(report.folds.len(), data.len());
    assert_eq!(report.total.total(), data.len());
    assert_eq!(
        report.total.correct + report.total.incorrect + report.total.undecided,
        report.folds.iter().map(|f| f.tally.total() ).sum::<usize>()
    );
    for (i, fold) in report.folds.iter().enumerate() {
        assert_eq!((fold.start, fold.end), (i, i));
    }
}

#[test]
fn generic_csv_round_trip() {
    let data = gaussian_clouds(4, None);
    let mut content = String::new();
    for i in 0..data.len() {
        let p = data.point(i);
        content += &format!("{},{},{}\n", p[0], p[1], data.label(i));
    }
    let loaded = load_reader(content.as_bytes(), DatasetFormat::Generic).unwrap();
    assert_eq!(loaded, data);
}

#[test]
fn class_sorted_data_needs_enough_folds() {
    // With two folds over three sorted classes, the first testing block holds all of class 1.
    let data = gaussian_clouds(5, None);
    let err = validate::k_fold(&data, ClassifierKind::Optimal, 2).unwrap_err();
    assert!(matches!(err, ClassifyError::EmptyClass { label : 1 }));
    let seeded = ValidationConfig::new().with_folds(2).with_seed(3);
    assert!(validate::cross_validate(&data, ClassifierKind::Optimal, &seeded, |_| { }).is_ok());
}

#[test]
fn validation_report_serializes() {
    let data = weather();
    let report = validate::k_fold(&data, ClassifierKind::DecisionTree, 7).unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["kind"], "DecisionTree");
    assert_eq!(json["folds"].as_array().unwrap().len(), 7);
    assert_eq!(json["total"]["correct"].as_u64().unwrap() as usize, report.total.correct);
}
