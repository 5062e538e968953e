use serde::{Deserialize, Serialize};

/// Errors for connectivity values that do not describe a neighbourhood.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityError {
    #[error("connectivity {connectivity} is not one of 4, 8 (2D) or 6, 18, 26 (3D)")]
    Unknown { connectivity: u32 },
    #[error("connectivity {connectivity} is not valid for {ndim}D grids")]
    Rank { connectivity: u32, ndim: usize },
}

/// Neighbourhood rule deciding which cells touch.
///
/// Serialised as the neighbour count (`4`, `8`, `6`, `18`, `26`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Connectivity {
    /// 2D, shared edges.
    Four,
    /// 2D, shared edges or corners.
    Eight,
    /// 3D, shared faces.
    Six,
    /// 3D, shared faces or edges.
    Eighteen,
    /// 3D, shared faces, edges or corners.
    TwentySix,
}

impl Connectivity {
    /// Parse a neighbour count for a grid of rank `ndim`.
    pub fn from_neighbors(neighbors: u32, ndim: usize) -> Result<Self, ConnectivityError> {
        let conn = Self::try_from(neighbors)?;
        conn.check_rank(ndim)?;
        Ok(conn)
    }

    /// Number of neighbours of an interior cell.
    pub fn neighbors(self) -> u32 {
        match self {
            Connectivity::Four => 4,
            Connectivity::Eight => 8,
            Connectivity::Six => 6,
            Connectivity::Eighteen => 18,
            Connectivity::TwentySix => 26,
        }
    }

    /// Grid rank this rule applies to.
    pub fn ndim(self) -> usize {
        match self {
            Connectivity::Four | Connectivity::Eight => 2,
            _ => 3,
        }
    }

    /// Face connectivity for a rank (4 for 2D, 6 for 3D).
    pub fn face(ndim: usize) -> Self {
        if ndim == 2 {
            Connectivity::Four
        } else {
            Connectivity::Six
        }
    }

    /// Full connectivity for a rank (8 for 2D, 26 for 3D).
    pub fn full(ndim: usize) -> Self {
        if ndim == 2 {
            Connectivity::Eight
        } else {
            Connectivity::TwentySix
        }
    }

    /// Dual rule for the background of a foreground labelled with `self`.
    ///
    /// Pairs 4 with 8 and 6 with 26; 18 maps to 6.
    pub fn complement(self) -> Self {
        match self {
            Connectivity::Four => Connectivity::Eight,
            Connectivity::Eight => Connectivity::Four,
            Connectivity::Six => Connectivity::TwentySix,
            Connectivity::Eighteen | Connectivity::TwentySix => Connectivity::Six,
        }
    }

    pub fn check_rank(self, ndim: usize) -> Result<(), ConnectivityError> {
        if self.ndim() == ndim {
            Ok(())
        } else {
            Err(ConnectivityError::Rank {
                connectivity: self.neighbors(),
                ndim,
            })
        }
    }

    /// Largest `|dz| + |dy| + |dx|` of a neighbour offset.
    fn max_steps(self) -> i32 {
        match self {
            Connectivity::Four | Connectivity::Six => 1,
            Connectivity::Eight | Connectivity::Eighteen => 2,
            Connectivity::TwentySix => 3,
        }
    }

    /// All neighbour offsets as `[dz, dy, dx]`, in raster order.
    pub fn offsets(self) -> Vec<[isize; 3]> {
        let dz_range = if self.ndim() == 2 { 0isize..=0 } else { -1..=1 };
        let mut out = Vec::with_capacity(self.neighbors() as usize);
        for dz in dz_range {
            for dy in -1isize..=1 {
                for dx in -1isize..=1 {
                    let steps = (dz.abs() + dy.abs() + dx.abs()) as i32;
                    if steps == 0 || steps > self.max_steps() {
                        continue;
                    }
                    out.push([dz, dy, dx]);
                }
            }
        }
        out
    }

    /// Offsets of neighbours visited before the centre in a raster scan.
    pub fn backward_offsets(self) -> Vec<[isize; 3]> {
        self.offsets()
            .into_iter()
            .filter(|&o| o < [0, 0, 0])
            .collect()
    }
}

impl TryFrom<u32> for Connectivity {
    type Error = ConnectivityError;

    fn try_from(neighbors: u32) -> Result<Self, Self::Error> {
        match neighbors {
            4 => Ok(Connectivity::Four),
            8 => Ok(Connectivity::Eight),
            6 => Ok(Connectivity::Six),
            18 => Ok(Connectivity::Eighteen),
            26 => Ok(Connectivity::TwentySix),
            other => Err(ConnectivityError::Unknown {
                connectivity: other,
            }),
        }
    }
}

impl From<Connectivity> for u32 {
    fn from(conn: Connectivity) -> Self {
        conn.neighbors()
    }
}
