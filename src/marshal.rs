//! Binary serialization of [`AvlTree`]s.
//!
//! # Format
//!
//! All integers are 4-byte big-endian `i32`s.
//!
//! An empty tree is the single byte `0`. A non-empty tree is:
//!
//! ```text
//! tree  := 0x00 count node
//! node  := key-length key-bytes in-order-index left right
//! left  := 0 | 2 node
//! right := 0 | 4 node
//! ```
//!
//! Nodes are written in preorder, so the stream records the exact tree shape and
//! reading it back needs no rebalancing. Each node carries its position in ascending
//! order, from which the reader rebuilds the linked list once every node is known.
//!
//! Key bytes are produced by a [`KeyMarshaller`]. Reading is strict: a stream that is
//! truncated, carries trailing bytes, has an unknown marker, repeats or skips an
//! in-order index, or decodes to a tree that is unordered or unbalanced is rejected
//! with a [`MarshalError`] and no tree is returned.

use alloc::format;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use crate::avl_tree::AvlTree;
use crate::comparator::{Comparator, NaturalOrder};
use crate::error::MarshalError;
use crate::raw::{Handle, RawAvlTree};

const TREE_MARKER: u8 = 0;
const NO_CHILD: i32 = 0;
const LEFT_CHILD: i32 = 2;
const RIGHT_CHILD: i32 = 4;

/// Smallest encoded node: key length, in-order index and two child markers.
const MIN_NODE_BYTES: usize = 16;

/// Nesting limit while reading. A balanced tree this deep would hold more nodes than
/// any count the format can express.
const MAX_DEPTH: usize = 64;

/// Converts keys to and from the byte payload stored for each node.
pub trait KeyMarshaller<K> {
    /// Encodes `key`.
    ///
    /// # Errors
    ///
    /// [`MarshalError::Key`] if the key cannot be encoded.
    fn serialize(&self, key: &K) -> Result<Vec<u8>, MarshalError>;

    /// Decodes a key from exactly the bytes one call to
    /// [`serialize`](KeyMarshaller::serialize) produced.
    ///
    /// # Errors
    ///
    /// [`MarshalError::Key`] if `bytes` is not a valid encoding.
    fn deserialize(&self, bytes: &[u8]) -> Result<K, MarshalError>;
}

/// Stores [`String`] keys as their UTF-8 bytes.
#[derive(Clone, Copy, Debug, Default)]
pub struct StringMarshaller;

impl KeyMarshaller<String> for StringMarshaller {
    fn serialize(&self, key: &String) -> Result<Vec<u8>, MarshalError> {
        Ok(key.as_bytes().to_vec())
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<String, MarshalError> {
        String::from_utf8(bytes.to_vec()).map_err(|error| MarshalError::Key(format!("{error}")))
    }
}

/// Stores byte-string keys verbatim.
#[derive(Clone, Copy, Debug, Default)]
pub struct BytesMarshaller;

impl KeyMarshaller<Vec<u8>> for BytesMarshaller {
    fn serialize(&self, key: &Vec<u8>) -> Result<Vec<u8>, MarshalError> {
        Ok(key.clone())
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<Vec<u8>, MarshalError> {
        Ok(bytes.to_vec())
    }
}

/// Stores `i64` keys as 8 big-endian bytes.
#[derive(Clone, Copy, Debug, Default)]
pub struct I64Marshaller;

impl KeyMarshaller<i64> for I64Marshaller {
    fn serialize(&self, key: &i64) -> Result<Vec<u8>, MarshalError> {
        Ok(key.to_be_bytes().to_vec())
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<i64, MarshalError> {
        let bytes: [u8; 8] = bytes
            .try_into()
            .map_err(|_| MarshalError::Key(format!("expected 8 bytes for an i64 key, got {}", bytes.len())))?;
        Ok(i64::from_be_bytes(bytes))
    }
}

/// Serializes and deserializes [`AvlTree`]s in the format described in the
/// [module documentation](self).
///
/// # Examples
///
/// ```
/// use avl_core::AvlTree;
/// use avl_core::marshal::{AvlTreeMarshaller, I64Marshaller};
///
/// let tree: AvlTree<i64> = [3, 1, 2].into_iter().collect();
/// let marshaller = AvlTreeMarshaller::natural(I64Marshaller);
///
/// let bytes = marshaller.serialize(&tree)?;
/// let copy = marshaller.deserialize(&bytes)?;
/// assert_eq!(copy, tree);
/// assert_eq!(copy.structure().to_string(), tree.structure().to_string());
/// # Ok::<(), avl_core::MarshalError>(())
/// ```
#[derive(Clone, Debug)]
pub struct AvlTreeMarshaller<M, C = NaturalOrder> {
    comparator: C,
    key_marshaller: M,
}

impl<M> AvlTreeMarshaller<M> {
    /// Makes a marshaller for trees ordered by the key's [`Ord`] implementation.
    #[must_use]
    pub const fn natural(key_marshaller: M) -> Self {
        Self::new(NaturalOrder, key_marshaller)
    }
}

impl<M, C> AvlTreeMarshaller<M, C> {
    /// Makes a marshaller whose decoded trees are ordered by `comparator`.
    #[must_use]
    pub const fn new(comparator: C, key_marshaller: M) -> Self {
        AvlTreeMarshaller {
            comparator,
            key_marshaller,
        }
    }

    /// Encodes `tree`.
    ///
    /// # Errors
    ///
    /// [`MarshalError::Key`] if a key cannot be encoded or an encoded key does not fit
    /// the length field, [`MarshalError::InvalidCount`] if the tree has more nodes than
    /// the count field can express.
    pub fn serialize<K, TC>(&self, tree: &AvlTree<K, TC>) -> Result<Vec<u8>, MarshalError>
    where
        M: KeyMarshaller<K>,
    {
        let raw = &tree.raw;
        let Some(root) = raw.root() else {
            return Ok(vec![TREE_MARKER]);
        };
        let count = i32::try_from(raw.len()).map_err(|_| MarshalError::InvalidCount {
            count: i64::try_from(raw.len()).unwrap_or(i64::MAX),
        })?;

        let mut indexes = vec![0; raw.slot_count()];
        let mut current = raw.first();
        let mut index = 0;
        while let Some(handle) = current {
            indexes[handle.slot()] = index;
            index += 1;
            current = raw.next(handle);
        }

        let mut out = Vec::with_capacity(5 + raw.len() * MIN_NODE_BYTES);
        out.push(TREE_MARKER);
        out.extend_from_slice(&count.to_be_bytes());
        self.write_node(raw, root, &indexes, &mut out)?;
        log::debug!("serialized {} keys into {} bytes", raw.len(), out.len());
        Ok(out)
    }

    fn write_node<K, TC>(
        &self,
        raw: &RawAvlTree<K, (), TC>,
        handle: Handle,
        indexes: &[i32],
        out: &mut Vec<u8>,
    ) -> Result<(), MarshalError>
    where
        M: KeyMarshaller<K>,
    {
        let node = raw.node(handle);
        let payload = self.key_marshaller.serialize(node.key())?;
        let length = i32::try_from(payload.len())
            .map_err(|_| MarshalError::Key(format!("encoded key of {} bytes is too long", payload.len())))?;
        out.extend_from_slice(&length.to_be_bytes());
        out.extend_from_slice(&payload);
        out.extend_from_slice(&indexes[handle.slot()].to_be_bytes());

        for (child, marker) in [(node.left(), LEFT_CHILD), (node.right(), RIGHT_CHILD)] {
            match child {
                Some(child) => {
                    out.extend_from_slice(&marker.to_be_bytes());
                    self.write_node(raw, child, indexes, out)?;
                }
                None => out.extend_from_slice(&NO_CHILD.to_be_bytes()),
            }
        }
        Ok(())
    }
}

impl<M, C: Clone> AvlTreeMarshaller<M, C> {
    /// Decodes a tree.
    ///
    /// # Errors
    ///
    /// Any [`MarshalError`] describing why `bytes` is not a well-formed tree. On error
    /// no partially decoded tree escapes.
    pub fn deserialize<K>(&self, bytes: &[u8]) -> Result<AvlTree<K, C>, MarshalError>
    where
        M: KeyMarshaller<K>,
        C: Comparator<K>,
    {
        let tree = self.read_tree(bytes).inspect_err(|error| {
            log::warn!("rejected serialized tree of {} bytes: {error}", bytes.len());
        })?;
        log::debug!("deserialized {} keys from {} bytes", tree.len(), bytes.len());
        Ok(tree)
    }

    fn read_tree<K>(&self, bytes: &[u8]) -> Result<AvlTree<K, C>, MarshalError>
    where
        M: KeyMarshaller<K>,
        C: Comparator<K>,
    {
        let mut reader = Reader { bytes, offset: 0 };
        let marker = reader.read_u8()?;
        if marker != TREE_MARKER {
            return Err(MarshalError::InvalidMarker {
                offset: 0,
                marker: i32::from(marker),
            });
        }
        if reader.remaining() == 0 {
            return Ok(AvlTree::with_comparator(self.comparator.clone()));
        }

        let count = reader.read_i32()?;
        let count = usize::try_from(count)
            .ok()
            .filter(|&count| count > 0 && count <= reader.remaining() / MIN_NODE_BYTES)
            .ok_or(MarshalError::InvalidCount {
                count: i64::from(count),
            })?;

        let mut raw = RawAvlTree::with_capacity(count, self.comparator.clone());
        let mut slots: Vec<Option<Handle>> = vec![None; count];
        let root = self.read_node(&mut reader, &mut raw, &mut slots, 1)?;
        if reader.remaining() > 0 {
            return Err(MarshalError::TrailingBytes {
                remaining: reader.remaining(),
            });
        }

        let order = slots.into_iter().collect::<Option<Vec<Handle>>>().ok_or(MarshalError::InvalidCount {
            count: i64::try_from(raw.slot_count()).unwrap_or(i64::MAX),
        })?;
        raw.set_root(Some(root));
        raw.link_in_order(&order);
        raw.validate()?;
        Ok(AvlTree { raw })
    }

    fn read_node<K>(
        &self,
        reader: &mut Reader<'_>,
        raw: &mut RawAvlTree<K, (), C>,
        slots: &mut [Option<Handle>],
        depth: usize,
    ) -> Result<Handle, MarshalError>
    where
        M: KeyMarshaller<K>,
    {
        if depth > MAX_DEPTH {
            return Err(MarshalError::TooDeep { limit: MAX_DEPTH });
        }

        let length_offset = reader.offset;
        let length = reader.read_i32()?;
        let length = usize::try_from(length).map_err(|_| MarshalError::InvalidLength {
            offset: length_offset,
            length,
        })?;
        let key = self.key_marshaller.deserialize(reader.read_bytes(length)?)?;

        let index = reader.read_i32()?;
        let slot = usize::try_from(index)
            .ok()
            .and_then(|index| slots.get_mut(index))
            .filter(|slot| slot.is_none())
            .ok_or(MarshalError::InvalidIndex {
                index: i64::from(index),
            })?;
        let handle = raw.alloc_detached(key, ());
        *slot = Some(handle);

        let left = self.read_child(reader, raw, slots, depth, LEFT_CHILD)?;
        let right = self.read_child(reader, raw, slots, depth, RIGHT_CHILD)?;
        raw.set_children(handle, left, right);
        Ok(handle)
    }

    fn read_child<K>(
        &self,
        reader: &mut Reader<'_>,
        raw: &mut RawAvlTree<K, (), C>,
        slots: &mut [Option<Handle>],
        depth: usize,
        expected: i32,
    ) -> Result<Option<Handle>, MarshalError>
    where
        M: KeyMarshaller<K>,
    {
        let offset = reader.offset;
        match reader.read_i32()? {
            NO_CHILD => Ok(None),
            marker if marker == expected => self.read_node(reader, raw, slots, depth + 1).map(Some),
            marker => Err(MarshalError::InvalidMarker { offset, marker }),
        }
    }
}

struct Reader<'b> {
    bytes: &'b [u8],
    offset: usize,
}

impl<'b> Reader<'b> {
    fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }

    fn read_bytes(&mut self, len: usize) -> Result<&'b [u8], MarshalError> {
        if len > self.remaining() {
            return Err(MarshalError::Truncated {
                offset: self.offset,
                needed: len - self.remaining(),
            });
        }
        let bytes = &self.bytes[self.offset..self.offset + len];
        self.offset += len;
        Ok(bytes)
    }

    fn read_u8(&mut self) -> Result<u8, MarshalError> {
        Ok(self.read_bytes(1)?[0])
    }

    fn read_i32(&mut self) -> Result<i32, MarshalError> {
        let mut word = [0; 4];
        word.copy_from_slice(self.read_bytes(4)?);
        Ok(i32::from_be_bytes(word))
    }
}
