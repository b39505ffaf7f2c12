//! One-time derivation of the propagation state from a parsed element
//! record: unit conversion, Brouwer mean-motion recovery, secular drag and
//! gravity coefficients, and orbit-regime selection.

use crate::frames::sidereal_time;
use crate::tle::TleRecord;

use super::deep_space::{DeepSpace, DeepSpaceParams};
use super::{DragSeries, InvalidOrbitError, Propagator, Regime, TEMP4, TWO_PI, X2O3};

/// Orbital periods at and above this many minutes take the deep-space path.
const DEEP_SPACE_PERIOD_MIN: f64 = 225.0;

pub(super) fn build(record: &TleRecord) -> Result<Propagator, InvalidOrbitError> {
    let gravity = record.gravity_model.constants();

    // TLE units to radians and radians per minute.
    let no_kozai = record.mean_motion_rev_day * TWO_PI / 1440.0;
    let ecco = record.eccentricity;
    let inclo = record.inclination_deg.to_radians();
    let nodeo = record.right_ascension_deg.to_radians();
    let argpo = record.arg_perigee_deg.to_radians();
    let mo = record.mean_anomaly_deg.to_radians();
    let bstar = record.bstar;

    // Recover the Brouwer mean motion from the Kozai value.
    let eccsq = ecco * ecco;
    let omeosq = 1.0 - eccsq;
    let rteosq = omeosq.sqrt();
    let cosio = inclo.cos();
    let cosio2 = cosio * cosio;

    let ak = (gravity.ke / no_kozai).powf(X2O3);
    let d1 = 0.75 * gravity.j2 * (3.0 * cosio2 - 1.0) / (rteosq * omeosq);
    let mut del = d1 / (ak * ak);
    let adel = ak * (1.0 - del * del - del * (1.0 / 3.0 + 134.0 * del * del / 81.0));
    del = d1 / (adel * adel);
    let no_unkozai = no_kozai / (1.0 + del);

    if !no_unkozai.is_finite() {
        return Err(InvalidOrbitError::NonFinite {
            name: "mean motion",
        });
    }
    if no_unkozai <= 0.0 {
        return Err(InvalidOrbitError::MeanMotion { value: no_unkozai });
    }

    let ao = (gravity.ke / no_unkozai).powf(X2O3);
    let sinio = inclo.sin();
    let po = ao * omeosq;
    let con42 = 1.0 - 5.0 * cosio2;
    let con41 = -con42 - cosio2 - cosio2;
    let posq = po * po;
    let rp = ao * (1.0 - ecco);
    if rp < 1.0 {
        return Err(InvalidOrbitError::SubOrbital { radius_er: rp });
    }

    let gsto = sidereal_time(record.epoch.value());

    // Atmospheric density fit: the standard profile assumes a perigee
    // height of 156 km and above; lower perigees re-fit the s4 parameter.
    let ss = 78.0 / gravity.radius_km + 1.0;
    let qzms2t = ((120.0 - 78.0) / gravity.radius_km).powi(4);
    let perige = (rp - 1.0) * gravity.radius_km;
    let mut sfour = ss;
    let mut qzms24 = qzms2t;
    if perige < 156.0 {
        sfour = if perige < 98.0 { 20.0 } else { perige - 78.0 };
        qzms24 = ((120.0 - sfour) / gravity.radius_km).powi(4);
        sfour = sfour / gravity.radius_km + 1.0;
    }

    let pinvsq = 1.0 / posq;
    let tsi = 1.0 / (ao - sfour);
    let eta = ao * ecco * tsi;
    let etasq = eta * eta;
    let eeta = ecco * eta;
    let psisq = (1.0 - etasq).abs();
    let coef = qzms24 * tsi.powi(4);
    let coef1 = coef / psisq.powf(3.5);
    let cc2 = coef1
        * no_unkozai
        * (ao * (1.0 + 1.5 * etasq + eeta * (4.0 + etasq))
            + 0.375 * gravity.j2 * tsi / psisq
                * con41
                * (8.0 + 3.0 * etasq * (8.0 + etasq)));
    let cc1 = bstar * cc2;
    let cc3 = if ecco > 1.0e-4 {
        -2.0 * coef * tsi * gravity.j3_over_j2 * no_unkozai * sinio / ecco
    } else {
        0.0
    };
    let x1mth2 = 1.0 - cosio2;
    let cc4 = 2.0
        * no_unkozai
        * coef1
        * ao
        * omeosq
        * (eta * (2.0 + 0.5 * etasq) + ecco * (0.5 + 2.0 * etasq)
            - gravity.j2 * tsi / (ao * psisq)
                * (-3.0 * con41 * (1.0 - 2.0 * eeta + etasq * (1.5 - 0.5 * eeta))
                    + 0.75 * x1mth2 * (2.0 * etasq - eeta * (1.0 + etasq)) * (2.0 * argpo).cos()));
    let cc5 = 2.0 * coef1 * ao * omeosq * (1.0 + 2.75 * (etasq + eeta) + eeta * etasq);

    // Secular rates of mean anomaly, perigee and node from J2/J4.
    let cosio4 = cosio2 * cosio2;
    let temp1 = 1.5 * gravity.j2 * pinvsq * no_unkozai;
    let temp2 = 0.5 * temp1 * gravity.j2 * pinvsq;
    let temp3 = -0.46875 * gravity.j4 * pinvsq * pinvsq * no_unkozai;
    let mdot = no_unkozai
        + 0.5 * temp1 * rteosq * con41
        + 0.0625 * temp2 * rteosq * (13.0 - 78.0 * cosio2 + 137.0 * cosio4);
    let argpdot = -0.5 * temp1 * con42
        + 0.0625 * temp2 * (7.0 - 114.0 * cosio2 + 395.0 * cosio4)
        + temp3 * (3.0 - 36.0 * cosio2 + 49.0 * cosio4);
    let xhdot1 = -temp1 * cosio;
    let nodedot =
        xhdot1 + (0.5 * temp2 * (4.0 - 19.0 * cosio2) + 2.0 * temp3 * (3.0 - 7.0 * cosio2)) * cosio;
    let xpidot = argpdot + nodedot;

    let omgcof = bstar * cc3 * argpo.cos();
    let xmcof = if ecco > 1.0e-4 {
        -X2O3 * coef * bstar / eeta
    } else {
        0.0
    };
    let nodecf = 3.5 * omeosq * xhdot1 * cc1;
    let t2cof = 1.5 * cc1;
    let xlcof = if (cosio + 1.0).abs() > TEMP4 {
        -0.25 * gravity.j3_over_j2 * sinio * (3.0 + 5.0 * cosio) / (1.0 + cosio)
    } else {
        -0.25 * gravity.j3_over_j2 * sinio * (3.0 + 5.0 * cosio) / TEMP4
    };
    let aycof = -0.5 * gravity.j3_over_j2 * sinio;
    let delmotemp = 1.0 + eta * mo.cos();
    let delmo = delmotemp * delmotemp * delmotemp;
    let sinmao = mo.sin();
    let x7thm1 = 7.0 * cosio2 - 1.0;

    for (name, value) in [
        ("secular mean anomaly rate", mdot),
        ("secular node rate", nodedot),
        ("drag coefficient", cc1),
    ] {
        if !value.is_finite() {
            return Err(InvalidOrbitError::NonFinite { name });
        }
    }

    let period_minutes = TWO_PI / no_unkozai;
    let deep = period_minutes >= DEEP_SPACE_PERIOD_MIN;

    let regime = if deep {
        log::debug!(
            "catalog {} period {period_minutes:.1} min: deep-space regime",
            record.catalog_number
        );
        let params = DeepSpaceParams {
            ke: gravity.ke,
            ecco,
            inclo,
            nodeo,
            argpo,
            mo,
            no_unkozai,
            mdot,
            nodedot,
            xpidot,
            gsto,
            epoch_days_1950: record.epoch.days_since_1950(),
        };
        Regime::DeepSpace(Box::new(DeepSpace::initialize(&params)))
    } else {
        Regime::NearEarth
    };

    // High-order drag terms are dropped for deep-space orbits and for
    // perigees inside 220 km, where the series stops converging.
    let low_perigee = rp < 220.0 / gravity.radius_km + 1.0;
    let drag = if deep || low_perigee {
        None
    } else {
        let cc1sq = cc1 * cc1;
        let d2 = 4.0 * ao * tsi * cc1sq;
        let temp = d2 * tsi * cc1 / 3.0;
        let d3 = (17.0 * ao + sfour) * temp;
        let d4 = 0.5 * temp * ao * tsi * (221.0 * ao + 31.0 * sfour) * cc1;
        let t3cof = d2 + 2.0 * cc1sq;
        let t4cof = 0.25 * (3.0 * d3 + cc1 * (12.0 * d2 + 10.0 * cc1sq));
        let t5cof =
            0.2 * (3.0 * d4 + 12.0 * cc1 * d3 + 6.0 * d2 * d2 + 15.0 * cc1sq * (2.0 * d2 + cc1sq));
        Some(DragSeries {
            d2,
            d3,
            d4,
            t3cof,
            t4cof,
            t5cof,
        })
    };

    Ok(Propagator {
        gravity,
        epoch: record.epoch,
        bstar,
        ecco,
        argpo,
        inclo,
        mo,
        nodeo,
        no_unkozai,
        gsto,
        con41,
        cc1,
        cc4,
        cc5,
        eta,
        mdot,
        argpdot,
        nodedot,
        nodecf,
        omgcof,
        xmcof,
        t2cof,
        x1mth2,
        x7thm1,
        aycof,
        xlcof,
        delmo,
        sinmao,
        drag,
        regime,
    })
}
