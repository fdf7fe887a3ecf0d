//! Fakes written out by hand, the way `#[fake]` expands them.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[allow(unused_imports)]
use crate::private::{self, format_inputs, NoDebug, ProperDebug};
use crate::{DataMember, Interface, Method, Proxy};

pub trait Shapes {
    fn area(&self, w: u32, h: u32) -> u32;
    fn scale(&mut self, factor: f64);
    fn name(&self, prefix: &str) -> String;

    fn sides(&self) -> &u8;
    fn sides_mut(&mut self) -> &mut u8;
    fn tracker(&self) -> &Tracker;
}

impl Interface for dyn Shapes {
    const NAME: &'static str = "Shapes";
    const METHODS: &'static [&'static str] = &["area", "scale", "name"];
    const MEMBERS: &'static [&'static str] = &["sides", "tracker", "spare"];

    fn upcast(proxy: &Proxy<Self>) -> &Self {
        proxy
    }

    fn upcast_mut(proxy: &mut Proxy<Self>) -> &mut Self {
        proxy
    }
}

#[allow(non_snake_case)]
pub mod ShapesApi {
    #[allow(non_camel_case_types)]
    pub struct area;
    #[allow(non_camel_case_types)]
    pub struct scale;
    #[allow(non_camel_case_types)]
    pub struct name;
    #[allow(non_camel_case_types)]
    pub struct sides;
    #[allow(non_camel_case_types)]
    pub struct tracker;
    #[allow(non_camel_case_types)]
    pub struct spare;
}

impl Method for ShapesApi::area {
    type Interface = dyn Shapes;
    type Args = (u32, u32);
    type Output = u32;
    const NAME: &'static str = "area";

    fn debug_args(args: &Self::Args) -> String {
        format_inputs(&[(&args.0).polymock_try_debug(), (&args.1).polymock_try_debug()])
    }

    fn call_real(real: &mut Self::Interface, (w, h): Self::Args) -> u32 {
        real.area(w, h)
    }
}

impl Method for ShapesApi::scale {
    type Interface = dyn Shapes;
    type Args = (f64,);
    type Output = ();
    const NAME: &'static str = "scale";

    fn debug_args(args: &Self::Args) -> String {
        format_inputs(&[(&args.0).polymock_try_debug()])
    }

    fn call_real(real: &mut Self::Interface, (factor,): Self::Args) {
        real.scale(factor)
    }
}

impl Method for ShapesApi::name {
    type Interface = dyn Shapes;
    type Args = (String,);
    type Output = String;
    const NAME: &'static str = "name";

    fn debug_args(args: &Self::Args) -> String {
        format_inputs(&[(&args.0).polymock_try_debug()])
    }

    fn call_real(real: &mut Self::Interface, (prefix,): Self::Args) -> String {
        real.name(::core::borrow::Borrow::borrow(&prefix))
    }
}

impl DataMember for ShapesApi::sides {
    type Interface = dyn Shapes;
    type Value = u8;
    const NAME: &'static str = "sides";
}

impl DataMember for ShapesApi::tracker {
    type Interface = dyn Shapes;
    type Value = Tracker;
    const NAME: &'static str = "tracker";
}

impl DataMember for ShapesApi::spare {
    type Interface = dyn Shapes;
    type Value = Tracker;
    const NAME: &'static str = "spare";
}

impl Shapes for Proxy<dyn Shapes> {
    fn area(&self, w: u32, h: u32) -> u32 {
        private::dispatch::<ShapesApi::area>(self, 0usize, (w, h))
    }

    fn scale(&mut self, factor: f64) {
        private::dispatch::<ShapesApi::scale>(self, 1usize, (factor,))
    }

    fn name(&self, prefix: &str) -> String {
        private::dispatch::<ShapesApi::name>(self, 2usize, (ToOwned::to_owned(prefix),))
    }

    fn sides(&self) -> &u8 {
        private::member::<ShapesApi::sides>(self)
    }

    fn sides_mut(&mut self) -> &mut u8 {
        private::member_mut::<ShapesApi::sides>(self)
    }

    fn tracker(&self) -> &Tracker {
        private::member::<ShapesApi::tracker>(self)
    }
}

/// A real implementation, for spying.
pub struct Square {
    pub side: u32,
    pub sides: u8,
    pub tracker: Tracker,
}

impl Shapes for Square {
    fn area(&self, _: u32, _: u32) -> u32 {
        self.side * self.side
    }

    fn scale(&mut self, factor: f64) {
        self.side = (self.side as f64 * factor) as u32;
    }

    fn name(&self, prefix: &str) -> String {
        format!("{prefix}square")
    }

    fn sides(&self) -> &u8 {
        &self.sides
    }

    fn sides_mut(&mut self) -> &mut u8 {
        &mut self.sides
    }

    fn tracker(&self) -> &Tracker {
        &self.tracker
    }
}

pub trait Pair {
    fn pair(&self, n: i32, s: &str);
}

impl Interface for dyn Pair {
    const NAME: &'static str = "Pair";
    const METHODS: &'static [&'static str] = &["pair"];
    const MEMBERS: &'static [&'static str] = &[];

    fn upcast(proxy: &Proxy<Self>) -> &Self {
        proxy
    }

    fn upcast_mut(proxy: &mut Proxy<Self>) -> &mut Self {
        proxy
    }
}

#[allow(non_snake_case)]
pub mod PairApi {
    #[allow(non_camel_case_types)]
    pub struct pair;
}

impl Method for PairApi::pair {
    type Interface = dyn Pair;
    type Args = (i32, String);
    type Output = ();
    const NAME: &'static str = "pair";

    fn debug_args(args: &Self::Args) -> String {
        format_inputs(&[(&args.0).polymock_try_debug(), (&args.1).polymock_try_debug()])
    }

    fn call_real(real: &mut Self::Interface, (n, s): Self::Args) {
        real.pair(n, ::core::borrow::Borrow::borrow(&s))
    }
}

impl Pair for Proxy<dyn Pair> {
    fn pair(&self, n: i32, s: &str) {
        private::dispatch::<PairApi::pair>(self, 0usize, (n, ToOwned::to_owned(s)))
    }
}

/// An interface whose layout does not describe its methods.
pub trait Malformed {
    fn twice(&self);
}

impl Interface for dyn Malformed {
    const NAME: &'static str = "Malformed";
    const METHODS: &'static [&'static str] = &["twice", "twice"];
    const MEMBERS: &'static [&'static str] = &[];

    fn upcast(proxy: &Proxy<Self>) -> &Self {
        proxy
    }

    fn upcast_mut(proxy: &mut Proxy<Self>) -> &mut Self {
        proxy
    }
}

impl Malformed for Proxy<dyn Malformed> {
    fn twice(&self) {
        private::dispatch::<Broken::twice>(self, 0usize, ())
    }
}

#[allow(non_snake_case)]
pub mod Broken {
    #[allow(non_camel_case_types)]
    pub struct twice;
    #[allow(non_camel_case_types)]
    pub struct missing;
    #[allow(non_camel_case_types)]
    pub struct orphan;
}

impl Method for Broken::twice {
    type Interface = dyn Malformed;
    type Args = ();
    type Output = ();
    const NAME: &'static str = "twice";

    fn debug_args(_: &Self::Args) -> String {
        format_inputs(&[])
    }

    fn call_real(real: &mut Self::Interface, _: Self::Args) {
        real.twice()
    }
}

impl Method for Broken::missing {
    type Interface = dyn Malformed;
    type Args = ();
    type Output = ();
    const NAME: &'static str = "missing";

    fn debug_args(_: &Self::Args) -> String {
        format_inputs(&[])
    }

    fn call_real(real: &mut Self::Interface, _: Self::Args) {
        real.twice()
    }
}

impl DataMember for Broken::orphan {
    type Interface = dyn Malformed;
    type Value = u8;
    const NAME: &'static str = "orphan";
}

/// Counts drops of the [Tracker]s attached to it.
#[derive(Clone, Default)]
pub struct DropCounter {
    pub drops: Arc<AtomicUsize>,
    order: Arc<spin::Mutex<Vec<&'static str>>>,
}

impl DropCounter {
    /// Labels of the dropped trackers, in drop order.
    pub fn order(&self) -> Vec<&'static str> {
        self.order.lock().clone()
    }
}

#[derive(Default)]
pub struct Tracker {
    attached: Option<(DropCounter, &'static str)>,
}

impl Tracker {
    pub fn attach(&mut self, counter: &DropCounter, label: &'static str) {
        self.attached = Some((counter.clone(), label));
    }
}

impl Drop for Tracker {
    fn drop(&mut self) {
        if let Some((counter, label)) = self.attached.take() {
            counter.drops.fetch_add(1, Ordering::SeqCst);
            counter.order.lock().push(label);
        }
    }
}

/// Two methods with the same argument snapshot type.
pub trait Switch {
    fn on(&self, level: u8);
    fn off(&self, level: u8);
}

impl Interface for dyn Switch {
    const NAME: &'static str = "Switch";
    const METHODS: &'static [&'static str] = &["on", "off"];
    const MEMBERS: &'static [&'static str] = &[];

    fn upcast(proxy: &Proxy<Self>) -> &Self {
        proxy
    }

    fn upcast_mut(proxy: &mut Proxy<Self>) -> &mut Self {
        proxy
    }
}

#[allow(non_snake_case)]
pub mod SwitchApi {
    #[allow(non_camel_case_types)]
    pub struct on;
    #[allow(non_camel_case_types)]
    pub struct off;
}

impl Method for SwitchApi::on {
    type Interface = dyn Switch;
    type Args = (u8,);
    type Output = ();
    const NAME: &'static str = "on";

    fn debug_args(args: &Self::Args) -> String {
        format_inputs(&[(&args.0).polymock_try_debug()])
    }

    fn call_real(real: &mut Self::Interface, (level,): Self::Args) {
        real.on(level)
    }
}

impl Method for SwitchApi::off {
    type Interface = dyn Switch;
    type Args = (u8,);
    type Output = ();
    const NAME: &'static str = "off";

    fn debug_args(args: &Self::Args) -> String {
        format_inputs(&[(&args.0).polymock_try_debug()])
    }

    fn call_real(real: &mut Self::Interface, (level,): Self::Args) {
        real.off(level)
    }
}

impl Switch for Proxy<dyn Switch> {
    fn on(&self, level: u8) {
        private::dispatch::<SwitchApi::on>(self, 0usize, (level,))
    }

    fn off(&self, level: u8) {
        private::dispatch::<SwitchApi::off>(self, 1usize, (level,))
    }
}
