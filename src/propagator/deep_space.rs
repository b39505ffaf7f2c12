//! Deep-space perturbations for orbits with periods of 225 minutes and
//! longer: lunar/solar secular rates, long-period periodic corrections,
//! and mean-motion resonance (synchronous and half-day) handling.

use std::f64::consts::PI;

const TWO_PI: f64 = 2.0 * PI;

// Solar and lunar mean-motion and eccentricity parameters.
const ZNS: f64 = 1.19459e-5;
const ZES: f64 = 0.01675;
const ZNL: f64 = 1.5835218e-4;
const ZEL: f64 = 0.05490;

// Earth rotation rate, radians per minute of sidereal time.
const RPTIM: f64 = 4.375_269_088_011_299_66e-3;

/// Everything the deep-space initialization needs from the common
/// near-earth setup.
pub(crate) struct DeepSpaceParams {
    pub ke: f64,
    pub ecco: f64,
    pub inclo: f64,
    pub nodeo: f64,
    pub argpo: f64,
    pub mo: f64,
    pub no_unkozai: f64,
    pub mdot: f64,
    pub nodedot: f64,
    pub xpidot: f64,
    pub gsto: f64,
    pub epoch_days_1950: f64,
}

/// Precomputed deep-space state: fixed after initialization.
#[derive(Debug, Clone)]
pub(crate) struct DeepSpace {
    // Secular rates contributed by lunar and solar attraction.
    dedt: f64,
    didt: f64,
    dmdt: f64,
    domdt: f64,
    dnodt: f64,
    periodics: Periodics,
    resonance: Resonance,
}

/// Long-period lunar/solar periodic coefficient tables.
#[derive(Debug, Clone)]
pub(crate) struct Periodics {
    // solar
    se2: f64,
    se3: f64,
    si2: f64,
    si3: f64,
    sl2: f64,
    sl3: f64,
    sl4: f64,
    sgh2: f64,
    sgh3: f64,
    sgh4: f64,
    sh2: f64,
    sh3: f64,
    // lunar
    ee2: f64,
    e3: f64,
    xi2: f64,
    xi3: f64,
    xl2: f64,
    xl3: f64,
    xl4: f64,
    xgh2: f64,
    xgh3: f64,
    xgh4: f64,
    xh2: f64,
    xh3: f64,
    // mean longitudes of the perturbing bodies at epoch
    zmol: f64,
    zmos: f64,
}

/// Resonance regime, selected once from the recovered mean motion. Each
/// variant holds only the coefficient set its integration needs.
#[derive(Debug, Clone)]
pub(crate) enum Resonance {
    None,
    /// Geosynchronous one-day resonance.
    Synchronous {
        del1: f64,
        del2: f64,
        del3: f64,
        xlamo: f64,
        xfact: f64,
    },
    /// Half-day resonance of eccentric 12-hour orbits.
    HalfDay {
        d2201: f64,
        d2211: f64,
        d3210: f64,
        d3222: f64,
        d4410: f64,
        d4422: f64,
        d5220: f64,
        d5232: f64,
        d5421: f64,
        d5433: f64,
        xlamo: f64,
        xfact: f64,
    },
}

/// Mean elements advanced by the secular model at some offset from epoch.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SecularState {
    pub em: f64,
    pub inclm: f64,
    pub argpm: f64,
    pub nodem: f64,
    pub mm: f64,
    pub nm: f64,
}

// Intermediate geometry shared between the two third-body passes and the
// secular-rate setup.
struct ThirdBodyGeometry {
    sinim: f64,
    cosim: f64,
    emsq: f64,
    s1: f64,
    s2: f64,
    s3: f64,
    s4: f64,
    s5: f64,
    ss1: f64,
    ss2: f64,
    ss3: f64,
    ss4: f64,
    ss5: f64,
    sz1: f64,
    sz3: f64,
    sz11: f64,
    sz13: f64,
    sz21: f64,
    sz23: f64,
    sz31: f64,
    sz33: f64,
    z1: f64,
    z3: f64,
    z11: f64,
    z13: f64,
    z21: f64,
    z23: f64,
    z31: f64,
    z33: f64,
}

impl DeepSpace {
    pub(crate) fn initialize(p: &DeepSpaceParams) -> DeepSpace {
        let (geometry, periodics) = third_body_terms(p);
        let (rates, resonance) = secular_rates_and_resonance(p, &geometry);
        DeepSpace {
            dedt: rates.0,
            didt: rates.1,
            dmdt: rates.2,
            domdt: rates.3,
            dnodt: rates.4,
            periodics,
            resonance,
        }
    }

    /// Advance the mean elements by the lunar/solar secular rates and,
    /// in a resonant regime, numerically integrate the resonance effects
    /// from epoch to `t`. Pure: the integrator restarts at epoch on every
    /// call, so repeated or out-of-order sampling sees identical state.
    pub(crate) fn secular(
        &self,
        t: f64,
        no_unkozai: f64,
        argpo: f64,
        argpdot: f64,
        gsto: f64,
        mut state: SecularState,
    ) -> SecularState {
        state.em += self.dedt * t;
        state.inclm += self.didt * t;
        state.argpm += self.domdt * t;
        state.nodem += self.dnodt * t;
        state.mm += self.dmdt * t;

        if matches!(self.resonance, Resonance::None) {
            return state;
        }

        let theta = (gsto + t * RPTIM) % TWO_PI;

        // Euler-Maclaurin integration in fixed 720-minute steps from epoch.
        const STEP: f64 = 720.0;
        const STEP2: f64 = 259_200.0;
        let delt = if t > 0.0 { STEP } else { -STEP };

        let mut atime = 0.0;
        let mut xni = no_unkozai;
        let mut xli = match self.resonance {
            Resonance::Synchronous { xlamo, .. } | Resonance::HalfDay { xlamo, .. } => xlamo,
            Resonance::None => unreachable!(),
        };

        let (xndt, xldot, xnddt, ft) = loop {
            let (xndt, xldot, xnddt) = self.dot_terms(xli, xni, atime, argpo, argpdot);
            if (t - atime).abs() < STEP {
                break (xndt, xldot, xnddt, t - atime);
            }
            xli += xldot * delt + xndt * STEP2;
            xni += xndt * delt + xnddt * STEP2;
            atime += delt;
        };

        state.nm = xni + xndt * ft + xnddt * ft * ft * 0.5;
        let xl = xli + xldot * ft + xndt * ft * ft * 0.5;
        state.mm = match self.resonance {
            Resonance::Synchronous { .. } => xl - state.nodem - state.argpm + theta,
            _ => xl - 2.0 * state.nodem + 2.0 * theta,
        };
        state
    }

    // Resonance derivatives at the integrator's current longitude and rate.
    fn dot_terms(
        &self,
        xli: f64,
        xni: f64,
        atime: f64,
        argpo: f64,
        argpdot: f64,
    ) -> (f64, f64, f64) {
        const FASX2: f64 = 0.13130908;
        const FASX4: f64 = 2.8843198;
        const FASX6: f64 = 0.37448087;
        const G22: f64 = 5.7686396;
        const G32: f64 = 0.95240898;
        const G44: f64 = 1.8014998;
        const G52: f64 = 1.0508330;
        const G54: f64 = 4.4108898;

        match self.resonance {
            Resonance::Synchronous {
                del1,
                del2,
                del3,
                xfact,
                ..
            } => {
                let xndt = del1 * (xli - FASX2).sin()
                    + del2 * (2.0 * (xli - FASX4)).sin()
                    + del3 * (3.0 * (xli - FASX6)).sin();
                let xldot = xni + xfact;
                let xnddt = (del1 * (xli - FASX2).cos()
                    + 2.0 * del2 * (2.0 * (xli - FASX4)).cos()
                    + 3.0 * del3 * (3.0 * (xli - FASX6)).cos())
                    * xldot;
                (xndt, xldot, xnddt)
            }
            Resonance::HalfDay {
                d2201,
                d2211,
                d3210,
                d3222,
                d4410,
                d4422,
                d5220,
                d5232,
                d5421,
                d5433,
                xfact,
                ..
            } => {
                let xomi = argpo + argpdot * atime;
                let x2omi = xomi + xomi;
                let x2li = xli + xli;
                let xndt = d2201 * (x2omi + xli - G22).sin()
                    + d2211 * (xli - G22).sin()
                    + d3210 * (xomi + xli - G32).sin()
                    + d3222 * (-xomi + xli - G32).sin()
                    + d4410 * (x2omi + x2li - G44).sin()
                    + d4422 * (x2li - G44).sin()
                    + d5220 * (xomi + xli - G52).sin()
                    + d5232 * (-xomi + xli - G52).sin()
                    + d5421 * (xomi + x2li - G54).sin()
                    + d5433 * (-xomi + x2li - G54).sin();
                let xldot = xni + xfact;
                let xnddt = (d2201 * (x2omi + xli - G22).cos()
                    + d2211 * (xli - G22).cos()
                    + d3210 * (xomi + xli - G32).cos()
                    + d3222 * (-xomi + xli - G32).cos()
                    + d5220 * (xomi + xli - G52).cos()
                    + d5232 * (-xomi + xli - G52).cos()
                    + 2.0
                        * (d4410 * (x2omi + x2li - G44).cos()
                            + d4422 * (x2li - G44).cos()
                            + d5421 * (xomi + x2li - G54).cos()
                            + d5433 * (-xomi + x2li - G54).cos()))
                    * xldot;
                (xndt, xldot, xnddt)
            }
            Resonance::None => unreachable!(),
        }
    }

    /// Apply the long-period lunar/solar periodic corrections at offset
    /// `t`, returning perturbed (e, incl, node, argp, M).
    pub(crate) fn long_period(
        &self,
        t: f64,
        mut ep: f64,
        mut inclp: f64,
        mut nodep: f64,
        mut argpp: f64,
        mut mp: f64,
    ) -> (f64, f64, f64, f64, f64) {
        let pt = &self.periodics;

        // solar terms
        let zm = pt.zmos + ZNS * t;
        let zf = zm + 2.0 * ZES * zm.sin();
        let sinzf = zf.sin();
        let f2 = 0.5 * sinzf * sinzf - 0.25;
        let f3 = -0.5 * sinzf * zf.cos();
        let ses = pt.se2 * f2 + pt.se3 * f3;
        let sis = pt.si2 * f2 + pt.si3 * f3;
        let sls = pt.sl2 * f2 + pt.sl3 * f3 + pt.sl4 * sinzf;
        let sghs = pt.sgh2 * f2 + pt.sgh3 * f3 + pt.sgh4 * sinzf;
        let shs = pt.sh2 * f2 + pt.sh3 * f3;

        // lunar terms
        let zm = pt.zmol + ZNL * t;
        let zf = zm + 2.0 * ZEL * zm.sin();
        let sinzf = zf.sin();
        let f2 = 0.5 * sinzf * sinzf - 0.25;
        let f3 = -0.5 * sinzf * zf.cos();
        let sel = pt.ee2 * f2 + pt.e3 * f3;
        let sil = pt.xi2 * f2 + pt.xi3 * f3;
        let sll = pt.xl2 * f2 + pt.xl3 * f3 + pt.xl4 * sinzf;
        let sghl = pt.xgh2 * f2 + pt.xgh3 * f3 + pt.xgh4 * sinzf;
        let shll = pt.xh2 * f2 + pt.xh3 * f3;

        let pe = ses + sel;
        let pinc = sis + sil;
        let pl = sls + sll;
        let pgh = sghs + sghl;
        let ph = shs + shll;

        inclp += pinc;
        ep += pe;
        let sinip = inclp.sin();
        let cosip = inclp.cos();

        if inclp >= 0.2 {
            let ph = ph / sinip;
            argpp += pgh - cosip * ph;
            nodep += ph;
            mp += pl;
        } else {
            // Lyddane modification near-zero inclination: perturb the node
            // through its sine/cosine projections to dodge the singularity.
            let sinop = nodep.sin();
            let cosop = nodep.cos();
            let alfdp = sinip * sinop + ph * cosop + pinc * cosip * sinop;
            let betdp = sinip * cosop - ph * sinop + pinc * cosip * cosop;

            nodep %= TWO_PI;
            let xls = mp + argpp + pl + pgh + (cosip - pinc * sinip) * nodep;
            let xnoh = nodep;
            nodep = alfdp.atan2(betdp);
            if (xnoh - nodep).abs() > PI {
                if nodep < xnoh {
                    nodep += TWO_PI;
                } else {
                    nodep -= TWO_PI;
                }
            }
            mp += pl;
            argpp = xls - mp - cosip * nodep;
        }

        (ep, inclp, nodep, argpp, mp)
    }
}

/// Third-body geometry and periodic tables at epoch: one pass for the sun,
/// one for the moon.
fn third_body_terms(p: &DeepSpaceParams) -> (ThirdBodyGeometry, Periodics) {
    const C1SS: f64 = 2.9864797e-6;
    const C1L: f64 = 4.7968065e-7;
    const ZSINIS: f64 = 0.39785416;
    const ZCOSIS: f64 = 0.91744867;
    const ZCOSGS: f64 = 0.1945905;
    const ZSINGS: f64 = -0.98088458;

    let nm = p.no_unkozai;
    let em = p.ecco;
    let snodm = p.nodeo.sin();
    let cnodm = p.nodeo.cos();
    let sinomm = p.argpo.sin();
    let cosomm = p.argpo.cos();
    let sinim = p.inclo.sin();
    let cosim = p.inclo.cos();
    let emsq = em * em;
    let betasq = 1.0 - emsq;
    let rtemsq = betasq.sqrt();

    let day = p.epoch_days_1950 + 18_261.5;
    let xnodce = (4.5236020 - 9.2422029e-4 * day) % TWO_PI;
    let stem = xnodce.sin();
    let ctem = xnodce.cos();
    let zcosil = 0.91375164 - 0.03568096 * ctem;
    let zsinil = (1.0 - zcosil * zcosil).sqrt();
    let zsinhl = 0.089683511 * stem / zsinil;
    let zcoshl = (1.0 - zsinhl * zsinhl).sqrt();
    let gam = 5.8351514 + 0.0019443680 * day;
    let mut zx = 0.39785416 * stem / zsinil;
    let zy = zcoshl * ctem + 0.91744867 * zsinhl * stem;
    zx = gam + zx.atan2(zy) - xnodce;
    let zcosgl = zx.cos();
    let zsingl = zx.sin();

    // First pass solar, second lunar.
    let mut zcosg = ZCOSGS;
    let mut zsing = ZSINGS;
    let mut zcosi = ZCOSIS;
    let mut zsini = ZSINIS;
    let mut zcosh = cnodm;
    let mut zsinh = snodm;
    let mut cc = C1SS;
    let xnoi = 1.0 / nm;

    let mut pass = [[0.0_f64; 19]; 2];
    for (lsflg, out) in pass.iter_mut().enumerate() {
        let a1 = zcosg * zcosh + zsing * zcosi * zsinh;
        let a3 = -zsing * zcosh + zcosg * zcosi * zsinh;
        let a7 = -zcosg * zsinh + zsing * zcosi * zcosh;
        let a8 = zsing * zsini;
        let a9 = zsing * zsinh + zcosg * zcosi * zcosh;
        let a10 = zcosg * zsini;
        let a2 = cosim * a7 + sinim * a8;
        let a4 = cosim * a9 + sinim * a10;
        let a5 = -sinim * a7 + cosim * a8;
        let a6 = -sinim * a9 + cosim * a10;

        let x1 = a1 * cosomm + a2 * sinomm;
        let x2 = a3 * cosomm + a4 * sinomm;
        let x3 = -a1 * sinomm + a2 * cosomm;
        let x4 = -a3 * sinomm + a4 * cosomm;
        let x5 = a5 * sinomm;
        let x6 = a6 * sinomm;
        let x7 = a5 * cosomm;
        let x8 = a6 * cosomm;

        let z31 = 12.0 * x1 * x1 - 3.0 * x3 * x3;
        let z32 = 24.0 * x1 * x2 - 6.0 * x3 * x4;
        let z33 = 12.0 * x2 * x2 - 3.0 * x4 * x4;
        let mut z1 = 3.0 * (a1 * a1 + a2 * a2) + z31 * emsq;
        let mut z2 = 6.0 * (a1 * a3 + a2 * a4) + z32 * emsq;
        let mut z3 = 3.0 * (a3 * a3 + a4 * a4) + z33 * emsq;
        let z11 = -6.0 * a1 * a5 + emsq * (-24.0 * x1 * x7 - 6.0 * x3 * x5);
        let z12 = -6.0 * (a1 * a6 + a3 * a5)
            + emsq * (-24.0 * (x2 * x7 + x1 * x8) - 6.0 * (x3 * x6 + x4 * x5));
        let z13 = -6.0 * a3 * a6 + emsq * (-24.0 * x2 * x8 - 6.0 * x4 * x6);
        let z21 = 6.0 * a2 * a5 + emsq * (24.0 * x1 * x5 - 6.0 * x3 * x7);
        let z22 = 6.0 * (a4 * a5 + a2 * a6)
            + emsq * (24.0 * (x2 * x5 + x1 * x6) - 6.0 * (x4 * x7 + x3 * x8));
        let z23 = 6.0 * a4 * a6 + emsq * (24.0 * x2 * x6 - 6.0 * x4 * x8);
        z1 = z1 + z1 + betasq * z31;
        z2 = z2 + z2 + betasq * z32;
        z3 = z3 + z3 + betasq * z33;
        let s3 = cc * xnoi;
        let s2 = -0.5 * s3 / rtemsq;
        let s4 = s3 * rtemsq;
        let s1 = -15.0 * em * s4;
        let s5 = x1 * x3 + x2 * x4;
        let s6 = x2 * x3 + x1 * x4;
        let s7 = x2 * x4 - x1 * x3;

        *out = [
            s1, s2, s3, s4, s5, s6, s7, z1, z2, z3, z11, z12, z13, z21, z22, z23, z31, z32, z33,
        ];

        if lsflg == 0 {
            zcosg = zcosgl;
            zsing = zsingl;
            zcosi = zcosil;
            zsini = zsinil;
            zcosh = zcoshl * cnodm + zsinhl * snodm;
            zsinh = snodm * zcoshl - cnodm * zsinhl;
            cc = C1L;
        }
    }
    let [solar, lunar] = pass;
    let [ss1, ss2, ss3, ss4, ss5, ss6, ss7, sz1, sz2, sz3, sz11, sz12, sz13, sz21, sz22, sz23, sz31, sz32, sz33] =
        solar;
    let [s1, s2, s3, s4, s5, s6, s7, z1, z2, z3, z11, z12, z13, z21, z22, z23, z31, z32, z33] =
        lunar;

    let zmol = (4.7199672 + 0.22997150 * day - gam).rem_euclid(TWO_PI);
    let zmos = (6.2565837 + 0.017201977 * day).rem_euclid(TWO_PI);

    let periodics = Periodics {
        se2: 2.0 * ss1 * ss6,
        se3: 2.0 * ss1 * ss7,
        si2: 2.0 * ss2 * sz12,
        si3: 2.0 * ss2 * (sz13 - sz11),
        sl2: -2.0 * ss3 * sz2,
        sl3: -2.0 * ss3 * (sz3 - sz1),
        sl4: -2.0 * ss3 * (-21.0 - 9.0 * emsq) * ZES,
        sgh2: 2.0 * ss4 * sz32,
        sgh3: 2.0 * ss4 * (sz33 - sz31),
        sgh4: -18.0 * ss4 * ZES,
        sh2: -2.0 * ss2 * sz22,
        sh3: -2.0 * ss2 * (sz23 - sz21),
        ee2: 2.0 * s1 * s6,
        e3: 2.0 * s1 * s7,
        xi2: 2.0 * s2 * z12,
        xi3: 2.0 * s2 * (z13 - z11),
        xl2: -2.0 * s3 * z2,
        xl3: -2.0 * s3 * (z3 - z1),
        xl4: -2.0 * s3 * (-21.0 - 9.0 * emsq) * ZEL,
        xgh2: 2.0 * s4 * z32,
        xgh3: 2.0 * s4 * (z33 - z31),
        xgh4: -18.0 * s4 * ZEL,
        xh2: -2.0 * s2 * z22,
        xh3: -2.0 * s2 * (z23 - z21),
        zmol,
        zmos,
    };

    let geometry = ThirdBodyGeometry {
        sinim,
        cosim,
        emsq,
        s1,
        s2,
        s3,
        s4,
        s5,
        ss1,
        ss2,
        ss3,
        ss4,
        ss5,
        sz1,
        sz3,
        sz11,
        sz13,
        sz21,
        sz23,
        sz31,
        sz33,
        z1,
        z3,
        z11,
        z13,
        z21,
        z23,
        z31,
        z33,
    };

    (geometry, periodics)
}

/// Secular contribution rates and the resonance selection with its
/// coefficient tables.
fn secular_rates_and_resonance(
    p: &DeepSpaceParams,
    g: &ThirdBodyGeometry,
) -> ((f64, f64, f64, f64, f64), Resonance) {
    const Q22: f64 = 1.7891679e-6;
    const Q31: f64 = 2.1460748e-6;
    const Q33: f64 = 2.2123015e-7;
    const ROOT22: f64 = 1.7891679e-6;
    const ROOT44: f64 = 7.3636953e-9;
    const ROOT54: f64 = 2.1765803e-9;
    const ROOT32: f64 = 3.7393792e-7;
    const ROOT52: f64 = 1.1428639e-7;
    const X2O3: f64 = 2.0 / 3.0;

    let nm = p.no_unkozai;
    let em = p.ecco;
    let emsq = g.emsq;
    let eccsq = em * em;
    let inclm = p.inclo;
    let sinim = g.sinim;
    let cosim = g.cosim;

    // Solar secular rates.
    let ses = g.ss1 * ZNS * g.ss5;
    let sis = g.ss2 * ZNS * (g.sz11 + g.sz13);
    let sls = -ZNS * g.ss3 * (g.sz1 + g.sz3 - 14.0 - 6.0 * emsq);
    let sghs = g.ss4 * ZNS * (g.sz31 + g.sz33 - 6.0);
    let mut shs = -ZNS * g.ss2 * (g.sz21 + g.sz23);
    // Inclinations within 3 degrees of 0 or 180 lose the node rate.
    if inclm < 5.2359877e-2 || inclm > PI - 5.2359877e-2 {
        shs = 0.0;
    }
    if sinim != 0.0 {
        shs /= sinim;
    }
    let sgs = sghs - cosim * shs;

    // Combined solar + lunar rates.
    let dedt = ses + g.s1 * ZNL * g.s5;
    let didt = sis + g.s2 * ZNL * (g.z11 + g.z13);
    let dmdt = sls - ZNL * g.s3 * (g.z1 + g.z3 - 14.0 - 6.0 * emsq);
    let sghl = g.s4 * ZNL * (g.z31 + g.z33 - 6.0);
    let mut shll = -ZNL * g.s2 * (g.z21 + g.z23);
    if inclm < 5.2359877e-2 || inclm > PI - 5.2359877e-2 {
        shll = 0.0;
    }
    let mut domdt = sgs + sghl;
    let mut dnodt = shs;
    if sinim != 0.0 {
        domdt -= cosim / sinim * shll;
        dnodt += shll / sinim;
    }

    let theta = p.gsto % TWO_PI;

    let resonance = if nm >= 8.26e-3 && nm <= 9.24e-3 && em >= 0.5 {
        // Half-day resonance; coefficient fits branch on eccentricity.
        let eoc = em * eccsq;
        let g201 = -0.306 - (em - 0.64) * 0.440;
        let (g211, g310, g322, g410, g422, g520);
        if em <= 0.65 {
            g211 = 3.616 - 13.2470 * em + 16.2900 * eccsq;
            g310 = -19.302 + 117.3900 * em - 228.4190 * eccsq + 156.5910 * eoc;
            g322 = -18.9068 + 109.7927 * em - 214.6334 * eccsq + 146.5816 * eoc;
            g410 = -41.122 + 242.6940 * em - 471.0940 * eccsq + 313.9530 * eoc;
            g422 = -146.407 + 841.8800 * em - 1629.014 * eccsq + 1083.4350 * eoc;
            g520 = -532.114 + 3017.977 * em - 5740.032 * eccsq + 3708.2760 * eoc;
        } else {
            g211 = -72.099 + 331.819 * em - 508.738 * eccsq + 266.724 * eoc;
            g310 = -346.844 + 1582.851 * em - 2415.925 * eccsq + 1246.113 * eoc;
            g322 = -342.585 + 1554.908 * em - 2366.899 * eccsq + 1215.972 * eoc;
            g410 = -1052.797 + 4758.686 * em - 7193.992 * eccsq + 3651.957 * eoc;
            g422 = -3581.690 + 16178.110 * em - 24462.770 * eccsq + 12422.520 * eoc;
            g520 = if em > 0.715 {
                -5149.66 + 29936.92 * em - 54087.36 * eccsq + 31324.56 * eoc
            } else {
                1464.74 - 4664.75 * em + 3763.64 * eccsq
            };
        }
        let (g533, g521, g532);
        if em < 0.7 {
            g533 = -919.22770 + 4988.61 * em - 9064.77 * eccsq + 5542.21 * eoc;
            g521 = -822.71072 + 4568.6173 * em - 8491.4146 * eccsq + 5337.524 * eoc;
            g532 = -853.66600 + 4690.25 * em - 8624.77 * eccsq + 5341.4 * eoc;
        } else {
            g533 = -37995.78 + 161616.52 * em - 229838.2 * eccsq + 109377.94 * eoc;
            g521 = -51752.104 + 218913.95 * em - 309468.16 * eccsq + 146349.42 * eoc;
            g532 = -40023.88 + 170470.89 * em - 242699.48 * eccsq + 115605.82 * eoc;
        }

        let cosisq = cosim * cosim;
        let sini2 = sinim * sinim;
        let f220 = 0.75 * (1.0 + 2.0 * cosim + cosisq);
        let f221 = 1.5 * sini2;
        let f321 = 1.875 * sinim * (1.0 - 2.0 * cosim - 3.0 * cosisq);
        let f322 = -1.875 * sinim * (1.0 + 2.0 * cosim - 3.0 * cosisq);
        let f441 = 35.0 * sini2 * f220;
        let f442 = 39.375 * sini2 * sini2;
        let f522 = 9.84375
            * sinim
            * (sini2 * (1.0 - 2.0 * cosim - 5.0 * cosisq)
                + 1.0 / 3.0 * (-2.0 + 4.0 * cosim + 6.0 * cosisq));
        let f523 = sinim
            * (4.92187512 * sini2 * (-2.0 - 4.0 * cosim + 10.0 * cosisq)
                + 6.56250012 * (1.0 + 2.0 * cosim - 3.0 * cosisq));
        let f542 =
            29.53125 * sinim * (2.0 - 8.0 * cosim + cosisq * (-12.0 + 8.0 * cosim + 10.0 * cosisq));
        let f543 =
            29.53125 * sinim * (-2.0 - 8.0 * cosim + cosisq * (12.0 + 8.0 * cosim - 10.0 * cosisq));

        let aonv = (nm / p.ke).powf(X2O3);
        let xno2 = nm * nm;
        let ainv2 = aonv * aonv;
        let mut temp1 = 3.0 * xno2 * ainv2;
        let mut temp = temp1 * ROOT22;
        let d2201 = temp * f220 * g201;
        let d2211 = temp * f221 * g211;
        temp1 *= aonv;
        temp = temp1 * ROOT32;
        let d3210 = temp * f321 * g310;
        let d3222 = temp * f322 * g322;
        temp1 *= aonv;
        temp = 2.0 * temp1 * ROOT44;
        let d4410 = temp * f441 * g410;
        let d4422 = temp * f442 * g422;
        temp1 *= aonv;
        temp = temp1 * ROOT52;
        let d5220 = temp * f522 * g520;
        let d5232 = temp * f523 * g532;
        temp = 2.0 * temp1 * ROOT54;
        let d5421 = temp * f542 * g521;
        let d5433 = temp * f543 * g533;

        Resonance::HalfDay {
            d2201,
            d2211,
            d3210,
            d3222,
            d4410,
            d4422,
            d5220,
            d5232,
            d5421,
            d5433,
            xlamo: (p.mo + 2.0 * p.nodeo - 2.0 * theta) % TWO_PI,
            xfact: p.mdot + dmdt + 2.0 * (p.nodedot + dnodt - RPTIM) - nm,
        }
    } else if nm > 0.0034906585 && nm < 0.0052359877 {
        // One-day (geosynchronous) resonance.
        let g200 = 1.0 + emsq * (-2.5 + 0.8125 * emsq);
        let g310 = 1.0 + 2.0 * emsq;
        let g300 = 1.0 + emsq * (-6.0 + 6.60937 * emsq);
        let f220 = 0.75 * (1.0 + cosim) * (1.0 + cosim);
        let f311 = 0.9375 * sinim * sinim * (1.0 + 3.0 * cosim) - 0.75 * (1.0 + cosim);
        let mut f330 = 1.0 + cosim;
        f330 = 1.875 * f330 * f330 * f330;
        let aonv = (nm / p.ke).powf(X2O3);
        let del1 = 3.0 * nm * nm * aonv * aonv;
        let del2 = 2.0 * del1 * f220 * g200 * Q22;
        let del3 = 3.0 * del1 * f330 * g300 * Q33 * aonv;
        let del1 = del1 * f311 * g310 * Q31 * aonv;

        Resonance::Synchronous {
            del1,
            del2,
            del3,
            xlamo: (p.mo + p.nodeo + p.argpo - theta) % TWO_PI,
            xfact: p.mdot + p.xpidot - RPTIM + dmdt + domdt + dnodt - nm,
        }
    } else {
        Resonance::None
    };

    ((dedt, didt, dmdt, domdt, dnodt), resonance)
}
