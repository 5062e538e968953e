use bintools_core::{Label, LabelField, Shape};
use bintools_label::{label, Connectivity, LabelError};
use log::debug;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Errors returned by morphology passes.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MorphError {
    #[error(transparent)]
    Label(#[from] LabelError),
}

/// Which foreground ids border one background component.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Enclosure {
    Open,
    Single(Label),
    Mixed,
}

impl Enclosure {
    fn with(self, l: Label) -> Self {
        match self {
            Enclosure::Open => Enclosure::Single(l),
            Enclosure::Single(s) if s == l => self,
            _ => Enclosure::Mixed,
        }
    }
}

/// Fill background pockets enclosed by a single component.
///
/// The background is labelled on its own with `background_connectivity`
/// (usually `foreground.complement()`). A background component that
/// reaches the field border stays background. A closed pocket whose
/// face-adjacent foreground cells all carry one id takes that id; a pocket
/// bordered by several ids stays background.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(labels), fields(len = labels.len()))
)]
pub fn fill_holes(
    labels: &LabelField,
    background_connectivity: Connectivity,
) -> Result<LabelField, MorphError> {
    let shape = labels.shape();
    let background = label(&labels.foreground().inverted(), background_connectivity)?;
    let pockets = background.max_label() as usize;
    if pockets == 0 {
        return Ok(labels.clone());
    }

    let faces = Connectivity::face(shape.ndim()).offsets();
    let ids = labels.as_slice();
    let mut reaches_border = vec![false; pockets + 1];
    let mut enclosure = vec![Enclosure::Open; pockets + 1];

    for (offset, &b) in background.as_slice().iter().enumerate() {
        if b == 0 {
            continue;
        }
        let b = b as usize;
        let at = shape.volume_coords(offset);
        if on_border(shape, at) {
            reaches_border[b] = true;
        }
        if reaches_border[b] {
            continue;
        }
        for &delta in &faces {
            if let Some(nb) = step(shape, at, delta) {
                if ids[nb] != 0 {
                    enclosure[b] = enclosure[b].with(ids[nb]);
                }
            }
        }
    }

    let mut filled = 0usize;
    let fill: Vec<Label> = (0..=pockets)
        .map(|b| match enclosure[b] {
            Enclosure::Single(l) if b > 0 && !reaches_border[b] => {
                filled += 1;
                l
            }
            _ => 0,
        })
        .collect();
    debug!("filled {filled} of {pockets} background components");

    let mut out = labels.clone();
    for (dst, &b) in out.as_mut_slice().iter_mut().zip(background.as_slice()) {
        if b != 0 {
            *dst = fill[b as usize];
        }
    }
    Ok(out)
}

fn on_border(shape: Shape, at: [usize; 3]) -> bool {
    let dims = shape.volume_dims();
    (3 - shape.ndim()..3).any(|axis| at[axis] == 0 || at[axis] + 1 == dims[axis])
}

fn step(shape: Shape, at: [usize; 3], delta: [isize; 3]) -> Option<usize> {
    let dims = shape.volume_dims();
    let mut c = [0usize; 3];
    for axis in 0..3 {
        c[axis] = at[axis].checked_add_signed(delta[axis])?;
        if c[axis] >= dims[axis] {
            return None;
        }
    }
    Some((c[0] * dims[1] + c[1]) * dims[2] + c[2])
}
