//! Branched cable geometry built from unbranched sections.

use std::f64::consts::PI;
use std::ops::Range;

use rxflux_core::SpaceInstanceId;
use smallvec::SmallVec;

use crate::error::SpaceError;
use crate::section::{Section, SectionId};
use crate::space::Space;

/// Attachment of a child section's 0-end to a point on its parent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Connection {
    /// The attached section.
    pub child: SectionId,
    /// The section it hangs from.
    pub parent: SectionId,
    /// Normalized position on the parent.
    pub parent_x: f64,
}

/// A tree of cylindrical sections, one cell per segment.
///
/// Adjacent segments of a section couple through the section's
/// cross-section over one segment length. A child's first segment couples
/// to the parent segment containing the attachment point, through the
/// smaller of the two cross-sections over the mean of the two segment
/// lengths. Free ends are no-flux.
///
/// # Examples
///
/// ```
/// use rxflux_space::{Cable, Section, Space};
///
/// let mut b = Cable::builder();
/// let soma = b.section(Section::new("soma", 20.0, 1, 20.0).unwrap());
/// let dend = b.section(Section::new("dend", 100.0, 5, 2.0).unwrap());
/// b.connect(dend, soma, 1.0);
/// let cable = b.build().unwrap();
///
/// assert_eq!(cable.cell_count(), 6);
/// // The soma touches the first dendrite segment.
/// assert_eq!(cable.neighbours(0).as_slice(), &[1]);
/// ```
#[derive(Debug, Clone)]
pub struct Cable {
    sections: Vec<Section>,
    connections: Vec<Connection>,
    offsets: Vec<usize>,
    volumes: Vec<f64>,
    adjacency: Vec<SmallVec<[(usize, f64); 4]>>,
    instance_id: SpaceInstanceId,
}

/// Builder for [`Cable`].
#[derive(Debug, Default)]
pub struct CableBuilder {
    sections: Vec<Section>,
    connections: Vec<Connection>,
}

impl CableBuilder {
    /// Add a section and return its id.
    pub fn section(&mut self, section: Section) -> SectionId {
        let id = SectionId(self.sections.len() as u32);
        self.sections.push(section);
        id
    }

    /// Attach `child`'s 0-end to `parent` at normalized position `parent_x`.
    ///
    /// Checked by [`build`](CableBuilder::build).
    pub fn connect(&mut self, child: SectionId, parent: SectionId, parent_x: f64) -> &mut Self {
        self.connections.push(Connection {
            child,
            parent,
            parent_x,
        });
        self
    }

    /// Validate the tree and compute adjacency.
    pub fn build(self) -> Result<Cable, SpaceError> {
        if self.sections.is_empty() {
            return Err(SpaceError::EmptySpace);
        }
        let n_sections = self.sections.len();

        let mut parent_of: Vec<Option<usize>> = vec![None; n_sections];
        for c in &self.connections {
            let child = c.child.0 as usize;
            let parent = c.parent.0 as usize;
            if child >= n_sections {
                return Err(SpaceError::UnknownSection(c.child));
            }
            if parent >= n_sections {
                return Err(SpaceError::UnknownSection(c.parent));
            }
            if child == parent {
                return Err(SpaceError::InvalidConnection {
                    reason: format!("section {} connected to itself", c.child),
                });
            }
            if !(0.0..=1.0).contains(&c.parent_x) {
                return Err(SpaceError::PositionOutOfRange { x: c.parent_x });
            }
            if parent_of[child].is_some() {
                return Err(SpaceError::InvalidConnection {
                    reason: format!("section {} already has a parent", c.child),
                });
            }
            parent_of[child] = Some(parent);
        }

        // Each parent chain must reach a root within n_sections hops.
        for start in 0..n_sections {
            let mut cur = start;
            let mut hops = 0;
            while let Some(p) = parent_of[cur] {
                hops += 1;
                if hops > n_sections {
                    return Err(SpaceError::InvalidConnection {
                        reason: format!("cycle through section {start}"),
                    });
                }
                cur = p;
            }
        }

        let mut offsets = Vec::with_capacity(n_sections);
        let mut volumes = Vec::new();
        for s in &self.sections {
            offsets.push(volumes.len());
            let v = s.segment_volume();
            volumes.extend(std::iter::repeat(v).take(s.nseg() as usize));
        }

        let mut adjacency: Vec<SmallVec<[(usize, f64); 4]>> =
            vec![SmallVec::new(); volumes.len()];
        let mut couple = |a: usize, b: usize, g: f64| {
            adjacency[a].push((b, g));
            adjacency[b].push((a, g));
        };

        for (s, &off) in self.sections.iter().zip(&offsets) {
            let g = s.cross_section() / s.dx();
            for i in 0..s.nseg() as usize - 1 {
                couple(off + i, off + i + 1, g);
            }
        }

        for c in &self.connections {
            let child = &self.sections[c.child.0 as usize];
            let parent = &self.sections[c.parent.0 as usize];
            let child_rank = offsets[c.child.0 as usize];
            let parent_rank = offsets[c.parent.0 as usize] + parent.segment_index(c.parent_x)?;
            let r = child.diam().min(parent.diam()) / 2.0;
            let g = PI * r * r / ((child.dx() + parent.dx()) / 2.0);
            couple(child_rank, parent_rank, g);
        }

        Ok(Cable {
            sections: self.sections,
            connections: self.connections,
            offsets,
            volumes,
            adjacency,
            instance_id: SpaceInstanceId::next(),
        })
    }
}

impl Cable {
    /// Start building a branched cable.
    pub fn builder() -> CableBuilder {
        CableBuilder::default()
    }

    /// A cable made of one unbranched section.
    pub fn single(section: Section) -> Result<Self, SpaceError> {
        let mut b = Self::builder();
        b.section(section);
        b.build()
    }

    /// All sections in id order.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// All connections in insertion order.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Look up a section.
    pub fn section(&self, id: SectionId) -> Option<&Section> {
        self.sections.get(id.0 as usize)
    }

    /// First section with the given name.
    pub fn section_by_name(&self, name: &str) -> Option<SectionId> {
        self.sections
            .iter()
            .position(|s| s.name() == name)
            .map(|i| SectionId(i as u32))
    }

    /// Ranks occupied by a section's segments, 0-end first.
    pub fn section_ranks(&self, id: SectionId) -> Option<Range<usize>> {
        let s = self.section(id)?;
        let start = self.offsets[id.0 as usize];
        Some(start..start + s.nseg() as usize)
    }

    /// Rank of the segment of `id` containing normalized position `x`.
    pub fn segment_at(&self, id: SectionId, x: f64) -> Result<usize, SpaceError> {
        let s = self.section(id).ok_or(SpaceError::UnknownSection(id))?;
        Ok(self.offsets[id.0 as usize] + s.segment_index(x)?)
    }

    /// Section and segment index of a rank.
    pub fn locate_rank(&self, rank: usize) -> Option<(SectionId, usize)> {
        if rank >= self.volumes.len() {
            return None;
        }
        // offsets is sorted; the owning section is the last one starting at or before rank.
        let idx = self.offsets.partition_point(|&o| o <= rank) - 1;
        Some((SectionId(idx as u32), rank - self.offsets[idx]))
    }
}

impl Space for Cable {
    fn cell_count(&self) -> usize {
        self.volumes.len()
    }

    fn neighbours(&self, rank: usize) -> SmallVec<[usize; 4]> {
        self.adjacency[rank].iter().map(|&(nb, _)| nb).collect()
    }

    fn volume(&self, rank: usize) -> f64 {
        self.volumes[rank]
    }

    fn coupling(&self, a: usize, b: usize) -> Option<f64> {
        self.adjacency
            .get(a)?
            .iter()
            .find(|&&(nb, _)| nb == b)
            .map(|&(_, g)| g)
    }

    fn max_neighbour_degree(&self) -> usize {
        self.adjacency.iter().map(|a| a.len()).max().unwrap_or(0)
    }

    fn instance_id(&self) -> SpaceInstanceId {
        self.instance_id
    }

    fn topology_eq(&self, other: &dyn Space) -> bool {
        other
            .downcast_ref::<Self>()
            .is_some_and(|o| self.sections == o.sections && self.connections == o.connections)
    }
}
