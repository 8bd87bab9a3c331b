use crate::utils::handle::HandleLike;

/// A sparse table of native objects, addressed by the handles a `Device` issued.
#[derive(Debug)]
pub struct DataVec<T>
where
    T: Sized,
{
    pub buf: Vec<Option<T>>,
    pub versions: Vec<u32>,
}

impl<T> DataVec<T>
where
    T: Sized,
{
    pub fn new() -> Self {
        DataVec {
            buf: Vec::new(),
            versions: Vec::new(),
        }
    }

    pub fn get<H: HandleLike>(&self, handle: H) -> Option<&T> {
        let index = handle.index() as usize;
        if let Some(&v) = self.versions.get(index) {
            if v == handle.version() {
                return self.buf[index].as_ref();
            }
        }

        None
    }

    pub fn get_mut<H: HandleLike>(&mut self, handle: H) -> Option<&mut T> {
        let index = handle.index() as usize;
        if let Some(&v) = self.versions.get(index) {
            if v == handle.version() {
                return self.buf[index].as_mut();
            }
        }

        None
    }

    pub fn create<H: HandleLike>(&mut self, handle: H, value: T) {
        let index = handle.index() as usize;

        while self.buf.len() <= index {
            self.buf.push(None);
            self.versions.push(0);
        }

        self.buf[index] = Some(value);
        self.versions[index] = handle.version();
    }

    pub fn free<H: HandleLike>(&mut self, handle: H) -> Option<T> {
        let index = handle.index() as usize;
        match self.versions.get(index) {
            Some(&v) if v == handle.version() => self.buf[index].take(),
            _ => None,
        }
    }

    /// Takes every remaining value out of the table.
    pub fn drain(&mut self) -> Vec<T> {
        self.versions.clear();
        self.buf.drain(..).filter_map(|v| v).collect()
    }
}
